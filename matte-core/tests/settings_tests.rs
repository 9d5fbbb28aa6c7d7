use matte_core::*;

// End-to-end settings scenarios exercised through the public API, the way
// the server builds them from a request.

#[test]
fn result_overrides_leave_mask_defaults_untouched() {
    // Request: colorType=green, similarity=0.3, blend=0.1, no mask overrides.
    let result_overrides = SettingsOverrides {
        color: None,
        similarity: Some(0.3),
        blend: Some(0.1),
    };

    let result = resolve_settings(ColorType::Green, Some(&result_overrides));
    let mask = resolve_settings(ColorType::Green, None);

    assert_eq!(
        result,
        ChromaKeySettings {
            color: "00FF00".to_string(),
            similarity: 0.3,
            blend: 0.1,
        }
    );
    assert_eq!(
        mask,
        ChromaKeySettings {
            color: "00FF00".to_string(),
            similarity: 0.01,
            blend: 0.08,
        }
    );
}

#[test]
fn detected_color_overrides_request_color_in_both_passes() {
    // The pipeline writes a successful detection into both override sets,
    // replacing any color the request carried.
    let mut result_overrides = SettingsOverrides {
        color: Some("00FF00".to_string()),
        similarity: Some(0.2),
        blend: None,
    };
    let mut mask_overrides = SettingsOverrides {
        color: Some("00FF00".to_string()),
        similarity: None,
        blend: None,
    };

    let detected = "1A2B3C".to_string();
    result_overrides.color = Some(detected.clone());
    mask_overrides.color = Some(detected);

    let result = resolve_settings(ColorType::Green, Some(&result_overrides));
    let mask = resolve_settings(ColorType::Green, Some(&mask_overrides));

    assert_eq!(result.color, "1A2B3C");
    assert_eq!(mask.color, "1A2B3C");
    // Non-color fields keep their own pass's values.
    assert_eq!(result.similarity, 0.2);
    assert_eq!(mask.similarity, 0.01);
}

#[test]
fn disjoint_override_sets_do_not_leak() {
    let a = SettingsOverrides {
        color: Some("ABCDEF".to_string()),
        similarity: None,
        blend: None,
    };
    let b = SettingsOverrides {
        color: None,
        similarity: Some(0.5),
        blend: None,
    };

    let from_a = resolve_settings(ColorType::Blue, Some(&a));
    let from_b = resolve_settings(ColorType::Blue, Some(&b));

    assert_eq!(from_a.color, "ABCDEF");
    assert_eq!(from_a.similarity, 0.3);
    assert_eq!(from_b.color, "0000FF");
    assert_eq!(from_b.similarity, 0.5);
}

#[test]
fn rgb_to_hex_clamps_and_uppercases() {
    assert_eq!(rgb_to_hex(0, 255, 0), "00FF00");
    assert_eq!(rgb_to_hex(300, -5, 128), "FF0080");
}
