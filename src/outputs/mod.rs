//! Output artifacts of a run.
//!
//! - [`dataset`]: the CSV dataset handed to the publisher
//!
//! ```text
//! output_path (e.g. articles.csv)
//! ├── Title,Link,Description
//! ├── <one row per cleaned article>
//! ```

pub mod dataset;
