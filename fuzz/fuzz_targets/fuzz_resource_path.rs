//! Fuzz target: `ResourcePath` parser
//!
//! Verifies:
//! - No panics under arbitrary input
//! - Anything accepted renders back to text that parses to the same path
//! - Creating a resource at the path fails the same way the parser does
//!
//! cargo fuzz run fuzz_resource_path

#![no_main]

use cloudnode::resource::{Methods, ResourcePath, ResourceRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let parsed = ResourcePath::parse(text);
    if let Ok(path) = parsed {
        assert_eq!(ResourcePath::parse(&path.to_string()), Ok(path));
    }

    let mut registry = ResourceRegistry::new();
    let created = registry.create(text, "", Methods::READ, false);
    assert_eq!(created.is_ok(), parsed.is_ok());
    assert_eq!(registry.len(), usize::from(created.is_ok()));
});
