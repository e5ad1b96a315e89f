//! Size-limit sentence grammars (`MaxDimensions` text).

pub mod helpers;
pub mod rules;
