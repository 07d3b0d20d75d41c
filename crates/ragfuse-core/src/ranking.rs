use std::cmp::Ordering;

use crate::types::SearchHit;

/// Score descending, then chunk id ascending.
pub fn hit_order(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.chunk_id.cmp(&b.chunk_id))
}

/// Keep the best `k` hits in [`hit_order`].
pub fn top_k(mut hits: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    if k == 0 {
        return Vec::new();
    }
    if hits.len() > k {
        hits.select_nth_unstable_by(k - 1, hit_order);
        hits.truncate(k);
    }
    hits.sort_by(hit_order);
    hits
}
