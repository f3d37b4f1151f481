pub mod aws;
pub mod deadline;
pub mod metrics;
pub mod object_store;
pub mod queue;
