use thiserror::Error;

/// InputValueError is used if some game option or parameter does not fulfill the posed
/// requirements, e.g., a non-positive round distance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid input value: {0}")]
pub struct InputValueError(pub String);

impl InputValueError {
    pub fn new(msg: impl Into<String>) -> Self {
        InputValueError(msg.into())
    }
}

/// argmax returns the index of the maximum value in the slice x (first one on ties). Returns
/// None for an empty slice.
pub fn argmax<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> Option<usize> {
    let mut iter = x.iter().enumerate();
    let (mut idx_max, mut val_max) = match iter.next() {
        Some((i, &val)) => (i, val),
        None => return None,
    };

    for (i, &val) in iter {
        if val > val_max {
            val_max = val;
            idx_max = i;
        }
    }

    Some(idx_max)
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort the slice. The sort is stable, i.e. equal values
/// keep their original order. NaN values are ordered after every other value in ascending order.
pub fn argsort(x: &[f64], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| x[a].total_cmp(&x[b])),
        SortOrder::Descending => indices.sort_by(|&a, &b| x[b].total_cmp(&x[a])),
    }
    indices
}

/// mean returns the arithmetic mean of the values, or None if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), val| (sum + val.into(), count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
