pub mod aggregator;
pub mod allocation;
pub mod comparator;
pub mod decision;
pub mod demand;
pub mod engine;
pub mod interval;
pub mod market;
pub mod normalizer;
pub mod period;
pub mod series;
pub mod timestamp;
