pub mod alfa;
pub mod beta;
pub mod feed;

pub use alfa::AlfaParser;
pub use beta::BetaParser;
pub use feed::{RssParser, SitemapParser};
