use tmx_core::{LayerPath, LayerRole, MapObject, TmxError};

use crate::xml::XmlElement;

const LAYER_ELEMENTS: [&str; 4] = ["layer", "objectgroup", "imagelayer", "group"];

/// Resolves a layer path against the map root. Groups are matched by name in
/// document order; the first leaf with the path's name and the role's element
/// wins. A leaf that only exists as another kind of layer is a role mismatch.
pub fn resolve_layer<'a>(
    root: &'a XmlElement,
    path: &LayerPath,
    role: LayerRole,
) -> Result<&'a XmlElement, TmxError> {
    let mut parents = vec![root];
    for group in path.groups() {
        parents = parents
            .into_iter()
            .flat_map(|parent| {
                parent
                    .elements_named("group")
                    .filter(move |child| child.attr("name") == Some(group.as_str()))
            })
            .collect();
    }

    let expected = role.element_name();
    let leaves = parents
        .iter()
        .flat_map(|parent| parent.children.iter())
        .filter(|child| child.attr("name") == Some(path.leaf()))
        .collect::<Vec<_>>();

    if let Some(found) = leaves.iter().copied().find(|leaf| leaf.name == expected) {
        tracing::debug!(layer = %path, role = role.label(), "resolved layer");
        return Ok(found);
    }

    if let Some(other) = leaves
        .iter()
        .find(|leaf| LAYER_ELEMENTS.contains(&leaf.name.as_str()))
    {
        return Err(TmxError::with_span(
            "LAYER_ROLE_MISMATCH",
            format!(
                "Layer \"{}\" is declared as a {} layer but resolves to <{}>, expected <{}>.",
                path,
                role.label(),
                other.name,
                expected
            ),
            other.location.clone(),
        ));
    }

    Err(TmxError::new(
        "LAYER_NOT_FOUND",
        format!("Layer \"{}\" ({} layer) does not exist.", path, role.label()),
    ))
}

/// Reads the `<object>` children of an object group in document order.
/// Names are kept verbatim; empty names read as anonymous.
pub fn read_objects(objects_layer: &XmlElement) -> Result<Vec<MapObject>, TmxError> {
    objects_layer
        .elements_named("object")
        .map(|node| {
            let name = node
                .attr("name")
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            let class = node.attr("type").or_else(|| node.attr("class")).unwrap_or("");
            Ok(MapObject::from_rect(
                node.coordinate_attr("x")?,
                node.coordinate_attr("y")?,
                node.coordinate_attr("width")?,
                node.coordinate_attr("height")?,
                name,
                class,
            ))
        })
        .collect()
}

#[cfg(test)]
mod layers_tests {
    use super::*;
    use crate::parser_test_support::root;

    const NESTED: &str = r#"
<map>
  <group name="world">
    <group name="front">
      <layer name="collisions"/>
      <objectgroup name="items"/>
    </group>
    <layer name="collisions"/>
  </group>
  <group name="world">
    <group name="back">
      <layer name="collisions"/>
    </group>
  </group>
  <objectgroup name="top">
    <object name="door" type="" x="10" y="40" width="16" height="16"/>
    <object class="enemy" x="0" y="0" width="8" height="8"/>
    <object name="" x="5.9" y="5.9"/>
  </objectgroup>
</map>"#;

    #[test]
    fn resolve_layer_walks_nested_groups() {
        let map = root(NESTED);
        let path = LayerPath::parse("world/front/collisions").expect("path");
        let layer = resolve_layer(&map, &path, LayerRole::Tiles).expect("layer should resolve");
        assert_eq!(layer.name, "layer");

        let items = LayerPath::parse("world/front/items").expect("path");
        let layer = resolve_layer(&map, &items, LayerRole::Objects).expect("objects layer");
        assert_eq!(layer.name, "objectgroup");
    }

    #[test]
    fn resolve_layer_searches_every_group_with_the_same_name() {
        let map = root(NESTED);
        let path = LayerPath::parse("world/back/collisions").expect("path");
        assert!(resolve_layer(&map, &path, LayerRole::Graphics).is_ok());
    }

    #[test]
    fn resolve_layer_reports_role_mismatch() {
        let map = root(NESTED);
        let path = LayerPath::parse("world/front/items").expect("path");
        let error = resolve_layer(&map, &path, LayerRole::Tiles).expect_err("wrong role");
        assert_eq!(error.code, "LAYER_ROLE_MISMATCH");
        assert!(error.span.is_some());

        let path = LayerPath::parse("world/collisions").expect("path");
        let error = resolve_layer(&map, &path, LayerRole::Objects).expect_err("wrong role");
        assert_eq!(error.code, "LAYER_ROLE_MISMATCH");
    }

    #[test]
    fn resolve_layer_reports_missing_layers() {
        let map = root(NESTED);
        for raw in ["nowhere", "world/side/collisions", "collisions"] {
            let path = LayerPath::parse(raw).expect("path");
            let error = resolve_layer(&map, &path, LayerRole::Tiles).expect_err("missing");
            assert_eq!(error.code, "LAYER_NOT_FOUND", "path {}", raw);
        }
    }

    #[test]
    fn read_objects_applies_anchor_transform_and_classes() {
        let map = root(NESTED);
        let path = LayerPath::parse("top").expect("path");
        let layer = resolve_layer(&map, &path, LayerRole::Objects).expect("layer");
        let objects = read_objects(layer).expect("objects should read");

        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].name.as_deref(), Some("door"));
        assert_eq!((objects[0].x, objects[0].y), (18, 32));
        assert_eq!(objects[0].class, "");

        assert_eq!(objects[1].name, None);
        assert_eq!(objects[1].class, "enemy");
        assert_eq!((objects[1].x, objects[1].y), (4, -4));

        assert_eq!(objects[2].name, None);
        assert_eq!((objects[2].x, objects[2].y), (5, 5));
    }
}
