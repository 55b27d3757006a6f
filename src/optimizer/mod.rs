//! # Optimizer Module
//!
//! Suddivide un run in sottomoduli specializzati:
//! - `batch_compressor`: orchestratore del run
//! - `task_optimizer`: worker per il singolo file
//! - `path_resolver`: calcolo dei path di output

pub mod batch_compressor;
pub mod path_resolver;
pub mod task_optimizer;

pub use batch_compressor::BatchCompressor;
pub use path_resolver::PathResolver;
pub use task_optimizer::TaskOptimizer;
