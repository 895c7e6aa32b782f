mod test_batch;
mod test_delegates;
mod test_lifecycle;
mod test_ordered_set;
