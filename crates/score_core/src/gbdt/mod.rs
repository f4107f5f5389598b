//! Symmetric-tree GBDT inference
//!
//! Trees are oblivious: each level applies one `(feature, threshold)` test
//! to every node on that level. A model is a bias plus weighted trees and
//! the ordered feature names they index.
//!
//! # Usage
//!
//! ```rust
//! use healthscore_core::gbdt::{Model, Split, Tree};
//!
//! let tree = Tree::new(vec![Split::new(0, 0.5)], vec![-2.0, 3.0], 0.05);
//! let model = Model::new(vec![tree], 55.0, vec!["calorie_density".into()]);
//!
//! let score = model.predict(&[1.2]).unwrap();
//! assert_eq!(score, 55.0 + 0.05 * 3.0);
//! ```

pub mod model;
pub mod tree;

pub use model::{Model, ModelMetadata, MODEL_VERSION};
pub use tree::{Split, Tree};
