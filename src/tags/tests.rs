use super::*;

#[test]
fn test_slugify() {
    assert_eq!(slugify("T-Shirt"), "t-shirt");
    assert_eq!(slugify("crew--neck"), "crew-neck");
    assert_eq!(slugify("  Polka   dot "), "polka-dot");
    assert_eq!(slugify("crew_neck"), "crew-neck");
    assert_eq!(slugify("100% Cotton!"), "100-cotton");
    assert_eq!(slugify("---"), "");
    assert_eq!(slugify(""), "");
}

#[test]
fn test_tag_token_applies_aliases() {
    assert_eq!(tag_token(KEY_TYPE, "tee").as_deref(), Some("type:tshirt"));
    assert_eq!(tag_token(KEY_TYPE, "T shirt").as_deref(), Some("type:tshirt"));
    assert_eq!(tag_token(KEY_TYPE, "T-Shirt").as_deref(), Some("type:tshirt"));
    assert_eq!(tag_token(KEY_PATTERN, "Stripes").as_deref(), Some("pattern:striped"));
    assert_eq!(tag_token(KEY_PATTERN, "polka dots").as_deref(), Some("pattern:polka-dot"));
    assert_eq!(tag_token(KEY_GRAPHIC, "Snake").as_deref(), Some("graphic:snake"));
}

#[test]
fn test_tag_token_drops_empty_values() {
    assert_eq!(tag_token(KEY_GRAPHIC, "none"), None);
    assert_eq!(tag_token(KEY_GRAPHIC, "N/A"), None);
    assert_eq!(tag_token(KEY_GRAPHIC, "  "), None);
}

#[test]
fn test_normalize_tag() {
    assert_eq!(normalize_tag("Type: T-Shirt").as_deref(), Some("type:tshirt"));
    assert_eq!(normalize_tag("pattern:striped").as_deref(), Some("pattern:striped"));
    assert_eq!(normalize_tag("Hooded").as_deref(), Some("feature:hooded"));
    assert_eq!(normalize_tag(":snake"), None);
    assert_eq!(normalize_tag("graphic:"), None);
}

#[test]
fn test_normalize_tags_full_extraction() {
    let vision = VisionExtraction {
        garment_types: vec!["T-Shirt".to_string()],
        patterns: vec!["Striped".to_string()],
        graphics: vec!["snake".to_string(), "Snake".to_string()],
        materials: vec!["Cotton".to_string()],
        features: vec!["crew neck".to_string()],
        styles: vec!["casual".to_string()],
        primary_color: Some("Black".to_string()),
        colors: vec!["black".to_string(), "green".to_string()],
        seasons: vec!["Summer".to_string()],
        ..Default::default()
    };

    assert_eq!(
        normalize_tags(&vision),
        vec![
            "type:tshirt",
            "pattern:striped",
            "graphic:snake",
            "material:cotton",
            "feature:crew-neck",
            "style:casual",
            "color:black",
            "color:green",
            "season:summer",
        ]
    );
}

#[test]
fn test_normalize_tags_skips_plain_patterns() {
    let vision = VisionExtraction {
        patterns: vec!["Solid".to_string(), "plain".to_string(), "none".to_string()],
        ..Default::default()
    };
    assert!(normalize_tags(&vision).is_empty());
}

#[test]
fn test_normalize_tags_empty_extraction() {
    assert!(normalize_tags(&VisionExtraction::default()).is_empty());
}
