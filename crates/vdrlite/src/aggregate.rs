use crate::model::{AggregateData, DocumentResult};

/// Sums fact and red-flag counts per category.
pub fn aggregate(docs: &[DocumentResult]) -> AggregateData {
    docs.iter().fold(AggregateData::default(), |mut acc, doc| {
        let bucket = acc.get_mut(doc.category);
        bucket.facts += doc.facts.len();
        bucket.red_flags += doc.red_flags.len();
        acc
    })
}
