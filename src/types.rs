// src/types.rs

use std::collections::HashMap;

use serde_json::Value;

/// Generic metadata container
pub type Metadata = HashMap<String, Value>;

/// Upstream product identifier; numeric ids are carried as their decimal text.
pub type ProductId = String;
