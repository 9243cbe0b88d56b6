//! Persisted payload through to rendered buttons: the full pipeline the
//! storefront script sees, fed by a real save.

#![allow(clippy::unwrap_used)]

use buylink_admin::links::LinkService;
use buylink_core::stored::{KEY_EXTERNAL_LINKS, NAMESPACE};
use buylink_core::{ExternalLink, OwnerId, ProductLinkConfig, normalize, parse_links, serialize_links};
use buylink_integration_tests::MemoryStore;
use buylink_storefront::render::{Container, ContainerDataset, RenderState};
use buylink_storefront::{parse_payload, validate_destination};

fn owner() -> OwnerId {
    OwnerId::new("gid://shopify/Product/1")
}

#[tokio::test]
async fn test_saved_value_renders_exactly_the_enabled_links() {
    let store = MemoryStore::new();
    let service = LinkService::new(&store);

    // Two real links (one disabled) plus a blank editor row.
    service
        .save(&ProductLinkConfig {
            owner_id: owner(),
            links: vec![
                ExternalLink::new("https://a.com", "A"),
                ExternalLink {
                    url: String::new(),
                    text: "B".to_string(),
                    enabled: true,
                },
                ExternalLink {
                    url: "https://c.com".to_string(),
                    text: "C".to_string(),
                    enabled: false,
                },
            ],
            hide_add_to_cart: false,
        })
        .await
        .unwrap();

    // The theme block emits the stored value verbatim as a data attribute.
    let entries = store.entries_for(&owner(), NAMESPACE);
    let attribute = &entries
        .iter()
        .find(|e| e.key == KEY_EXTERNAL_LINKS)
        .unwrap()
        .value;

    let mut container = Container::new(ContainerDataset {
        product_id: owner().to_string(),
        external_links: attribute.clone(),
        hide_atc: false,
        atc_override_selector: None,
    });

    let buttons = container.render();
    assert_eq!(buttons.len(), 1, "disabled and blank entries never render");
    assert_eq!(buttons[0].label, "A");
    assert!(validate_destination(&buttons[0].url));
    assert_eq!(container.state(), RenderState::Rendered);
}

#[test]
fn test_wire_roundtrip_equals_normalized_input() {
    let links = vec![
        ExternalLink::new("https://a.com", "A"),
        ExternalLink::default(),
        ExternalLink {
            url: "https://c.com".to_string(),
            text: String::new(),
            enabled: false,
        },
    ];
    let stored = serialize_links(&links).unwrap();
    assert_eq!(parse_links(&stored).unwrap(), normalize(&links));
    // The storefront's tolerant parser agrees with the strict one here.
    assert_eq!(parse_payload(&stored), normalize(&links));
}

#[test]
fn test_malformed_attribute_values_render_nothing() {
    for raw in ["", "[]", "{\"oops\": true}", "<liquid error>", "[{]"] {
        let mut container = Container::new(ContainerDataset {
            product_id: owner().to_string(),
            external_links: raw.to_string(),
            hide_atc: false,
            atc_override_selector: None,
        });
        assert!(container.render().is_empty(), "payload: {raw:?}");
        assert_eq!(container.state(), RenderState::Skipped);
    }
}

#[test]
fn test_legacy_escaped_attribute_still_renders() {
    let raw = "[{&quot;url&quot;=&gt;&quot;https://a.com&quot;,&quot;text&quot;=&gt;&quot;A&quot;,&quot;enabled&quot;=&gt;true}]";
    let mut container = Container::new(ContainerDataset {
        product_id: owner().to_string(),
        external_links: raw.to_string(),
        hide_atc: false,
        atc_override_selector: None,
    });
    let buttons = container.render();
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].url, "https://a.com");
}
