use scraper::Selector;
use std::sync::LazyLock;

/// Class token marking the element that holds every ranking entry.
pub const CONTAINER_CLASS: &str = "ranked-repositories";
/// Class token of the trailing non-data row inside the container.
pub const SENTINEL_CLASS: &str = "last";
/// Tag of the heading that wraps the owner and name links of an entry.
pub const HEADING_TAG: &str = "h3";

/// Child offsets inside the heading: `text, owner-link, separator, name-link`.
pub const OWNER_OFFSET: usize = 1;
pub const NAME_OFFSET: usize = 3;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(ANCHOR_SELECTOR, "a");
