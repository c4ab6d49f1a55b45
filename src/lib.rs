pub mod config;
pub mod logger;
pub mod content;
pub mod text_utils;
pub mod post_list;
pub mod post_metadata;
pub mod migration;
pub mod redirects;
pub mod data_cache;
pub mod site_data;
mod test_data;
