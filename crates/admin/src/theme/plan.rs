//! Pure template-patching logic.
//!
//! A JSON product template looks like:
//!
//! ```json
//! {
//!   "sections": {
//!     "main": {
//!       "type": "main-product",
//!       "blocks": { "title": { "type": "title" }, ... },
//!       "block_order": ["title", "price", "buy_buttons"]
//!     }
//!   },
//!   "order": ["main"]
//! }
//! ```
//!
//! Everything here is a guess over third-party-authored content with no
//! schema guarantee, so every heuristic is an ordered, data-driven list
//! rather than control flow.

use serde_json::{Map, Value, json};

use super::InstallError;

/// Stable substring identifying our app block in any template, regardless
/// of the extension uuid it was installed with.
pub const APP_BLOCK_MARKER: &str = "/blocks/external-links/";

/// Section id/type substrings that identify the product-form section,
/// searched in order.
const SECTION_CANDIDATES: &[&str] = &["product-form", "main-product"];

/// Insertion anchors, in priority order: the new block lands right after
/// the first matching block. Checked against block type and block id.
const BUY_BLOCK_MARKERS: &[&str] = &["buy_buttons", "buy-buttons", "cart", "checkout", "payment"];
const PICKER_BLOCK_MARKERS: &[&str] = &["quantity", "variant"];

/// Result of planning an install against one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The patched template body, ready to write back.
    Patched { content: String },
    /// The app block is already referenced somewhere in this template.
    AlreadyPresent,
}

/// Plan the insertion of `block_type` into a product template.
///
/// `block_key` is the caller-generated identifier the block is registered
/// under in the section's `blocks` map.
///
/// # Errors
///
/// - [`InstallError::InvalidTemplateJson`] when the template fails to parse
/// - [`InstallError::NoSuitableSection`] when no product-form-like section
///   is found
pub fn plan_install(
    template_json: &str,
    block_type: &str,
    block_key: &str,
) -> Result<PlanOutcome, InstallError> {
    let mut root: Value =
        serde_json::from_str(template_json).map_err(InstallError::InvalidTemplateJson)?;

    if template_json.contains(APP_BLOCK_MARKER) {
        return Ok(PlanOutcome::AlreadyPresent);
    }

    let section = find_target_section(&mut root).ok_or(InstallError::NoSuitableSection)?;
    insert_block(section, block_type, block_key);

    let content =
        serde_json::to_string_pretty(&root).map_err(InstallError::InvalidTemplateJson)?;
    Ok(PlanOutcome::Patched { content })
}

/// First section whose id or type contains a candidate substring.
fn find_target_section(root: &mut Value) -> Option<&mut Map<String, Value>> {
    let sections = root.get_mut("sections")?.as_object_mut()?;

    let mut target_id = None;
    for candidate in SECTION_CANDIDATES {
        target_id = sections
            .iter()
            .find(|(id, section)| {
                id.contains(candidate)
                    || section
                        .get("type")
                        .and_then(Value::as_str)
                        .is_some_and(|t| t.contains(candidate))
            })
            .map(|(id, _)| id.clone());
        if target_id.is_some() {
            break;
        }
    }

    sections.get_mut(&target_id?)?.as_object_mut()
}

/// Register the block and splice it into the order list at the chosen index.
fn insert_block(section: &mut Map<String, Value>, block_type: &str, block_key: &str) {
    let order: Vec<String> = section
        .get("block_order")
        .and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let index = insertion_index(section, &order);

    if let Some(blocks) = section
        .entry("blocks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
    {
        blocks.insert(
            block_key.to_string(),
            json!({ "type": block_type, "settings": {} }),
        );
    }

    let mut new_order = order;
    new_order.insert(index.min(new_order.len()), block_key.to_string());
    section.insert("block_order".to_string(), json!(new_order));
}

/// Priority search over the existing block order.
///
/// After the first buy-button-like block; else after the first quantity or
/// variant-picker-like block; else the very front.
fn insertion_index(section: &Map<String, Value>, order: &[String]) -> usize {
    let block_type_of = |id: &str| -> String {
        section
            .get("blocks")
            .and_then(|b| b.get(id))
            .and_then(|b| b.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    for markers in [BUY_BLOCK_MARKERS, PICKER_BLOCK_MARKERS] {
        let anchor = order.iter().position(|id| {
            let block_type = block_type_of(id);
            markers
                .iter()
                .any(|m| id.contains(m) || block_type.contains(m))
        });
        if let Some(i) = anchor {
            return i + 1;
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_TYPE: &str = "shopify://apps/buylink/blocks/external-links/abc-123";
    const BLOCK_KEY: &str = "external_links_test";

    fn template(sections: serde_json::Value) -> String {
        json!({ "sections": sections, "order": ["main"] }).to_string()
    }

    fn patched(template_json: &str) -> Value {
        match plan_install(template_json, BLOCK_TYPE, BLOCK_KEY).unwrap() {
            PlanOutcome::Patched { content } => serde_json::from_str(&content).unwrap(),
            PlanOutcome::AlreadyPresent => panic!("expected a patch"),
        }
    }

    fn block_order(patched: &Value) -> Vec<String> {
        patched["sections"]["main"]["block_order"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_invalid_json_is_tagged() {
        let err = plan_install("{ not json", BLOCK_TYPE, BLOCK_KEY).unwrap_err();
        assert_eq!(err.reason(), "invalid_template_json");
    }

    #[test]
    fn test_existing_block_short_circuits() {
        let body = template(json!({
            "main": {
                "type": "main-product",
                "blocks": { "x": { "type": "shopify://apps/buylink/blocks/external-links/other-uuid" } },
                "block_order": ["x"]
            }
        }));
        assert_eq!(
            plan_install(&body, BLOCK_TYPE, BLOCK_KEY).unwrap(),
            PlanOutcome::AlreadyPresent
        );
    }

    #[test]
    fn test_no_product_section_is_tagged() {
        let body = template(json!({ "hero": { "type": "image-banner" } }));
        let err = plan_install(&body, BLOCK_TYPE, BLOCK_KEY).unwrap_err();
        assert_eq!(err.reason(), "no_suitable_section");
    }

    #[test]
    fn test_section_matched_by_id_substring() {
        let body = json!({
            "sections": {
                "product-form-1": { "type": "custom", "blocks": {}, "block_order": [] }
            },
            "order": ["product-form-1"]
        })
        .to_string();
        let result = patched(&body);
        assert!(result["sections"]["product-form-1"]["blocks"][BLOCK_KEY]["type"]
            .as_str()
            .unwrap()
            .contains("external-links"));
    }

    #[test]
    fn test_inserts_after_buy_buttons_block() {
        let body = template(json!({
            "main": {
                "type": "main-product",
                "blocks": {
                    "title": { "type": "title" },
                    "qty": { "type": "quantity_selector" },
                    "buy": { "type": "buy_buttons" }
                },
                "block_order": ["title", "qty", "buy"]
            }
        }));
        assert_eq!(block_order(&patched(&body)), vec!["title", "qty", "buy", BLOCK_KEY]);
    }

    #[test]
    fn test_falls_back_to_variant_picker_anchor() {
        let body = template(json!({
            "main": {
                "type": "main-product",
                "blocks": {
                    "title": { "type": "title" },
                    "picker": { "type": "variant_picker" },
                    "share": { "type": "share" }
                },
                "block_order": ["title", "picker", "share"]
            }
        }));
        assert_eq!(block_order(&patched(&body)), vec!["title", "picker", BLOCK_KEY, "share"]);
    }

    #[test]
    fn test_prepends_when_no_anchor_matches() {
        let body = template(json!({
            "main": {
                "type": "main-product",
                "blocks": { "title": { "type": "title" } },
                "block_order": ["title"]
            }
        }));
        assert_eq!(block_order(&patched(&body)), vec![BLOCK_KEY, "title"]);
    }

    #[test]
    fn test_creates_blocks_map_when_section_has_none() {
        let body = template(json!({ "main": { "type": "main-product" } }));
        let result = patched(&body);
        assert_eq!(block_order(&result), vec![BLOCK_KEY]);
        assert_eq!(
            result["sections"]["main"]["blocks"][BLOCK_KEY]["type"],
            BLOCK_TYPE
        );
    }

    #[test]
    fn test_anchor_matched_by_block_id_when_type_is_opaque() {
        // Some themes use app blocks for buy buttons; the id still names it.
        let body = template(json!({
            "main": {
                "type": "main-product",
                "blocks": {
                    "title": { "type": "title" },
                    "dynamic-checkout": { "type": "@app" }
                },
                "block_order": ["title", "dynamic-checkout"]
            }
        }));
        assert_eq!(
            block_order(&patched(&body)),
            vec!["title", "dynamic-checkout", BLOCK_KEY]
        );
    }

    #[test]
    fn test_untouched_sections_survive_the_patch() {
        let body = json!({
            "sections": {
                "hero": { "type": "image-banner", "settings": { "height": 450 } },
                "main": { "type": "main-product", "blocks": {}, "block_order": [] }
            },
            "order": ["hero", "main"]
        })
        .to_string();
        let result = patched(&body);
        assert_eq!(result["sections"]["hero"]["settings"]["height"], 450);
        assert_eq!(result["order"], json!(["hero", "main"]));
    }
}
