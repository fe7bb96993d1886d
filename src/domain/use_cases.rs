pub mod applications;
pub mod auth;
pub mod companies;
pub mod experiences;
pub mod extractors;
pub mod jobs;
pub mod reviews;
pub mod rounds;
pub mod users;

use uuid::Uuid;

/// Distinct ids in first-seen order, for batched lookups.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
