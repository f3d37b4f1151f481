use std::ops::Range;

use thiserror::Error;

/// Consecutive slice of a page destined for one batch-send call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAssignment {
    pub batch_id: usize,
    pub start_index: usize,
    pub end_index_exclusive: usize,
}

impl BatchAssignment {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index_exclusive
    }

    pub fn len(&self) -> usize {
        self.end_index_exclusive - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchPlanError {
    #[error("batch limit must be a positive integer")]
    ZeroLimit,
    #[error("batch boundaries do not cover all {0} items")]
    IncompleteCoverage(usize),
    #[error("batch boundaries overlap or leave gaps")]
    Discontiguous,
}

/// Splits `total_items` into consecutive batches of at most `limit` items.
///
/// Every batch except possibly the last is full. An empty input yields an
/// empty plan.
pub fn compute_batch_plan(
    total_items: usize,
    limit: usize,
) -> Result<Vec<BatchAssignment>, BatchPlanError> {
    if limit == 0 {
        return Err(BatchPlanError::ZeroLimit);
    }

    let batch_count = total_items.div_ceil(limit);
    let mut assignments = Vec::with_capacity(batch_count);
    let mut cursor = 0usize;

    for batch_id in 0..batch_count {
        let end_index_exclusive = (cursor + limit).min(total_items);
        assignments.push(BatchAssignment {
            batch_id,
            start_index: cursor,
            end_index_exclusive,
        });
        cursor = end_index_exclusive;
    }

    validate_assignments(total_items, &assignments)?;
    Ok(assignments)
}

fn validate_assignments(
    total_items: usize,
    assignments: &[BatchAssignment],
) -> Result<(), BatchPlanError> {
    let Some((first, last)) = assignments.first().zip(assignments.last()) else {
        return if total_items == 0 {
            Ok(())
        } else {
            Err(BatchPlanError::IncompleteCoverage(total_items))
        };
    };

    if first.start_index != 0 || last.end_index_exclusive != total_items {
        return Err(BatchPlanError::IncompleteCoverage(total_items));
    }

    let contiguous = assignments
        .windows(2)
        .all(|pair| pair[0].end_index_exclusive == pair[1].start_index);
    if !contiguous || assignments.iter().any(BatchAssignment::is_empty) {
        return Err(BatchPlanError::Discontiguous);
    }

    Ok(())
}
