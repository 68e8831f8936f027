use crate::store::ReviewStore;
use crate::types::Review;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error("could not open seed file: {0}")]
    Open(#[from] std::io::Error),
    #[error("could not parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Appends the reviews in a JSON seed file to the store in file order.
/// Records whose id is already present are skipped. Returns the number appended.
pub fn load_seed(path: &Path, store: &ReviewStore) -> Result<usize, SeedError> {
    let file = File::open(path)?;
    let reviews: Vec<Review> = serde_json::from_reader(BufReader::new(file))?;

    let mut seen: HashSet<String> = store.all().into_iter().map(|r| r.id).collect();
    let mut loaded = 0;
    for review in reviews {
        if !seen.insert(review.id.clone()) {
            tracing::warn!(review_id = %review.id, "skipping seed review with duplicate id");
            continue;
        }
        store.append(review);
        loaded += 1;
    }

    tracing::info!(path = %path.display(), loaded, "loaded seed reviews");
    Ok(loaded)
}
