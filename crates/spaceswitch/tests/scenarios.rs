use approx::assert_relative_eq;
use spaceswitch::{
    write_config, ConfigError, GroupKind, Intersection, KeyOptions, SpaceError, Spaces,
    CONFIG_ATTRIBUTE,
};
use spaceswitch_math::{Tolerance, Transform, Vec3};
use spaceswitch_scene::{
    AttributeKind, MemoryScene, NodeType, SceneDocument, SceneError, SceneGraph, TangentType,
};

const HAND: &str = "|rig|arm|hand_CTRL";
const FOOT: &str = "|rig|foot_CTRL";

const RIG: &str = r#"{
    "nodes": [
        { "path": "|rig", "rotate": [0, 10, 0] },
        { "path": "|rig|chest", "translate": [1, 2, 0], "rotate": [10, 20, 30] },
        { "path": "|rig|chest|chest_LOC", "translate": [0, 1, 0] },
        { "path": "|rig|head_LOC", "translate": [0, 3, 0], "rotate": [0, 45, 0] },
        { "path": "|rig|world_LOC" },
        { "path": "|rig|arm", "translate": [2, 1, 0], "rotate": [0, 0, 25] },
        { "path": "|rig|arm|hand_CTRL", "type": "joint", "rotateOrder": "zxy",
          "translate": [2, 0, 0], "rotate": [15, -30, 40], "scale": [1, 1, 1],
          "attributes": [
            { "name": "spaceChest", "value": 0 },
            { "name": "spaceWorld", "value": 0 },
            { "name": "rotSpaceHead", "value": 0 },
            { "name": "rotSpaceWorld", "value": 0 }
          ],
          "orientDrivers": [
            { "locator": "|rig|arm" },
            { "attribute": "rotSpaceHead", "locator": "|rig|head_LOC" },
            { "attribute": "rotSpaceWorld", "locator": "|rig|world_LOC" }
          ] },
        { "path": "|rig|foot_CTRL", "translate": [0, 5, 0],
          "attributes": [
            { "name": "spaceChest", "value": 0 },
            { "name": "spaceWorld", "value": 0 }
          ] }
    ]
}"#;

const HAND_CONFIG: &str = r#"{
    "Spaces": { "Definitions": [
        { "name": "Rig" },
        { "attributeName": "spaceChest", "transformName": "|rig|chest|chest_LOC" },
        { "attributeName": "spaceWorld", "transformName": "|rig|world_LOC" }
    ] },
    "Rotation Spaces": { "Definitions": [
        { "name": "Spaces" },
        { "attributeName": "rotSpaceHead", "transformName": "|rig|head_LOC" },
        { "attributeName": "rotSpaceWorld", "transformName": "|rig|world_LOC" }
    ] }
}"#;

const FOOT_CONFIG: &str = r#"{
    "Spaces": { "Definitions": [
        { "name": "Rig", "transformName": "|rig|world_LOC" },
        { "attributeName": "spaceChest", "transformName": "|rig|chest|chest_LOC" },
        { "attributeName": "spaceWorld" }
    ] }
}"#;

fn rig() -> MemoryScene {
    let doc = SceneDocument::from_json(RIG).unwrap();
    MemoryScene::from_document(&doc).unwrap()
}

fn hand(scene: &MemoryScene) -> Spaces {
    Spaces::parse(scene, HAND, HAND_CONFIG).unwrap()
}

fn configured_rig() -> MemoryScene {
    let mut scene = rig();
    write_config(&mut scene, HAND, HAND_CONFIG).unwrap();
    write_config(&mut scene, FOOT, FOOT_CONFIG).unwrap();
    scene.clear_history();
    scene
}

fn assert_same_world(a: &Transform, b: &Transform) {
    assert!(
        Tolerance::DEFAULT.transforms_equal(a, b),
        "world matrices differ:\n{:?}\n{:?}",
        a.matrix,
        b.matrix
    );
}

#[test]
fn switch_enables_target_and_disables_later_siblings() {
    let mut scene = rig();
    let spaces = hand(&scene);
    scene.set_attribute(HAND, "spaceChest", 1.0).unwrap();
    scene.set_attribute(HAND, "spaceWorld", 1.0).unwrap();

    let chest = spaces.space_named(GroupKind::Spaces, "Space Chest").unwrap();
    chest.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceChest").unwrap(), 1.0);
    assert_eq!(scene.get_attribute(HAND, "spaceWorld").unwrap(), 0.0);

    let rig = spaces.space(GroupKind::Spaces, 0).unwrap();
    rig.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceChest").unwrap(), 0.0);
    assert_eq!(spaces.active_index(&scene, GroupKind::Spaces).unwrap(), Some(0));
}

#[test]
fn switch_leaves_earlier_siblings_alone() {
    let mut scene = rig();
    let spaces = hand(&scene);
    scene.set_attribute(HAND, "spaceChest", 1.0).unwrap();

    let world = spaces.space_named(GroupKind::Spaces, "Space World").unwrap();
    world.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceChest").unwrap(), 1.0);
    assert_eq!(scene.get_attribute(HAND, "spaceWorld").unwrap(), 1.0);
    assert_eq!(spaces.active_index(&scene, GroupKind::Spaces).unwrap(), Some(2));
}

#[test]
fn repeated_switch_writes_and_keys_nothing() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let chest = spaces.space_named(GroupKind::Spaces, "Space Chest").unwrap();

    chest.switch_to_space(&mut scene, &KeyOptions::keyed()).unwrap();
    let writes = scene.attribute_writes().len();
    let keys = scene.keyframes().len();
    assert_eq!(keys, 1);

    chest.switch_to_space(&mut scene, &KeyOptions::keyed()).unwrap();
    assert_eq!(scene.attribute_writes().len(), writes);
    assert_eq!(scene.keyframes().len(), keys);
}

#[test]
fn switching_back_to_base_keys_only_changed_attributes() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let options = KeyOptions {
        key_enabled: true,
        step_tangent_keys: true,
        ..KeyOptions::default()
    };

    let world = spaces.space_named(GroupKind::Spaces, "Space World").unwrap();
    world.switch_to_space(&mut scene, &options).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceChest").unwrap(), 0.0);
    assert_eq!(scene.get_attribute(HAND, "spaceWorld").unwrap(), 1.0);

    scene.clear_history();
    let base = spaces.space(GroupKind::Spaces, 0).unwrap();
    base.switch_to_space(&mut scene, &options).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceChest").unwrap(), 0.0);
    assert_eq!(scene.get_attribute(HAND, "spaceWorld").unwrap(), 0.0);
    let keyed: Vec<&str> = scene.keyframes().iter().map(|k| k.attribute.as_str()).collect();
    assert_eq!(keyed, vec!["spaceWorld"]);
    assert_eq!(scene.keyframes()[0].tangent, TangentType::Step);

    scene.clear_history();
    let forced = KeyOptions {
        force_key_if_already_at_value: true,
        ..options
    };
    base.switch_to_space(&mut scene, &forced).unwrap();
    assert_eq!(scene.keyframes().len(), 2);
}

#[test]
fn locator_lands_on_control() {
    let mut scene = rig();
    let spaces = Spaces::parse(&scene, FOOT, FOOT_CONFIG).unwrap();
    let rig = spaces.space_named(GroupKind::Spaces, "Rig").unwrap();

    rig.match_locator_to_control(&mut scene, &KeyOptions::default()).unwrap();

    let local = scene.local_matrix("|rig|world_LOC").unwrap();
    let parent_world = scene.world_matrix("|rig").unwrap();
    assert_relative_eq!(
        parent_world.then(&local).translation_part(),
        Vec3::new(0.0, 5.0, 0.0),
        epsilon = 1e-9
    );
}

#[test]
fn position_space_round_trip() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let before = scene.world_matrix(HAND).unwrap();
    let chest = spaces.space_named(GroupKind::Spaces, "Space Chest").unwrap();

    chest.match_locator_to_control(&mut scene, &KeyOptions::default()).unwrap();
    assert_same_world(&chest.world_matrix(&scene).unwrap(), &before);

    chest.match_control_to_locator(&mut scene, &KeyOptions::default()).unwrap();
    assert_same_world(&scene.world_matrix(HAND).unwrap(), &before);
}

#[test]
fn rotation_space_round_trip() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let before = scene.world_matrix(HAND).unwrap();
    let head = spaces.space_named(GroupKind::RotationSpaces, "Rot Space Head").unwrap();

    head.match_locator_to_control(&mut scene, &KeyOptions::default()).unwrap();
    assert_eq!(scene.get_attribute(HAND, "rotSpaceHead").unwrap(), 0.0);
    assert_same_world(&scene.world_matrix(HAND).unwrap(), &before);

    head.match_control_to_locator(&mut scene, &KeyOptions::default()).unwrap();
    assert_same_world(&scene.world_matrix(HAND).unwrap(), &before);
}

#[test]
fn matched_rotation_locator_makes_switch_seamless() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let before = scene.world_matrix(HAND).unwrap();
    let world = spaces.space_named(GroupKind::RotationSpaces, "Rot Space World").unwrap();

    world.match_locator_to_control(&mut scene, &KeyOptions::default()).unwrap();
    world.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
    assert_same_world(&scene.world_matrix(HAND).unwrap(), &before);
}

#[test]
fn control_matches_pose_of_unswitched_rotation_space() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let head = spaces.space_named(GroupKind::RotationSpaces, "Rot Space Head").unwrap();
    let base = spaces.space(GroupKind::RotationSpaces, 0).unwrap();

    head.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
    let expected = scene.world_matrix(HAND).unwrap();
    base.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();

    head.match_control_to_locator(&mut scene, &KeyOptions::keyed()).unwrap();
    assert_same_world(&scene.world_matrix(HAND).unwrap(), &expected);
    assert_eq!(scene.get_attribute(HAND, "rotSpaceHead").unwrap(), 0.0);
    assert!(scene
        .keyframes()
        .iter()
        .all(|k| k.node == HAND && k.attribute.starts_with("rotate")));
}

#[test]
fn locator_to_locator() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let chest = spaces.space_named(GroupKind::Spaces, "Space Chest").unwrap();
    let world = spaces.space_named(GroupKind::Spaces, "Space World").unwrap();

    chest
        .match_locator_to_locator(&mut scene, &world, &KeyOptions::default())
        .unwrap();
    assert_same_world(
        &chest.world_matrix(&scene).unwrap(),
        &world.world_matrix(&scene).unwrap(),
    );
}

/// Fails to report the joint orient while the head rotation space is on.
struct FlakyScene(MemoryScene);

impl SceneGraph for FlakyScene {
    fn exists(&self, node: &str) -> bool {
        self.0.exists(node)
    }
    fn node_type(&self, node: &str) -> spaceswitch_scene::Result<NodeType> {
        self.0.node_type(node)
    }
    fn find_by_short_name(&self, short_name: &str) -> Vec<String> {
        self.0.find_by_short_name(short_name)
    }
    fn has_attribute(&self, node: &str, attribute: &str) -> bool {
        self.0.has_attribute(node, attribute)
    }
    fn attribute_kind(&self, node: &str, attribute: &str) -> spaceswitch_scene::Result<AttributeKind> {
        self.0.attribute_kind(node, attribute)
    }
    fn attribute_nice_name(&self, node: &str, attribute: &str) -> spaceswitch_scene::Result<String> {
        self.0.attribute_nice_name(node, attribute)
    }
    fn is_keyable(&self, node: &str, attribute: &str) -> spaceswitch_scene::Result<bool> {
        self.0.is_keyable(node, attribute)
    }
    fn user_attributes(&self, node: &str) -> spaceswitch_scene::Result<Vec<String>> {
        self.0.user_attributes(node)
    }
    fn get_attribute(&self, node: &str, attribute: &str) -> spaceswitch_scene::Result<f64> {
        self.0.get_attribute(node, attribute)
    }
    fn set_attribute(&mut self, node: &str, attribute: &str, value: f64) -> spaceswitch_scene::Result<()> {
        self.0.set_attribute(node, attribute, value)
    }
    fn get_string_attribute(&self, node: &str, attribute: &str) -> spaceswitch_scene::Result<String> {
        self.0.get_string_attribute(node, attribute)
    }
    fn set_string_attribute(&mut self, node: &str, attribute: &str, value: &str) -> spaceswitch_scene::Result<()> {
        self.0.set_string_attribute(node, attribute, value)
    }
    fn add_string_attribute(&mut self, node: &str, attribute: &str) -> spaceswitch_scene::Result<()> {
        self.0.add_string_attribute(node, attribute)
    }
    fn set_keyframe(&mut self, node: &str, attribute: &str, tangent: TangentType) -> spaceswitch_scene::Result<()> {
        self.0.set_keyframe(node, attribute, tangent)
    }
    fn world_matrix(&self, node: &str) -> spaceswitch_scene::Result<Transform> {
        self.0.world_matrix(node)
    }
    fn parent_inverse_matrix(&self, node: &str) -> spaceswitch_scene::Result<Transform> {
        self.0.parent_inverse_matrix(node)
    }
    fn select(&mut self, nodes: &[String]) -> spaceswitch_scene::Result<()> {
        self.0.select(nodes)
    }
    fn selection(&self) -> Vec<String> {
        self.0.selection()
    }
    fn joint_orient(&self, node: &str) -> spaceswitch_scene::Result<Vec3> {
        if self.0.get_attribute(HAND, "rotSpaceHead")? != 0.0 {
            return Err(SceneError::Singular(node.to_string()));
        }
        self.0.joint_orient(node)
    }
}

#[test]
fn failed_probe_leaves_attributes_restored() {
    let mut scene = rig();
    let spaces = hand(&scene);
    let head = spaces.space_named(GroupKind::RotationSpaces, "Rot Space Head").unwrap();

    let orient = head.probe_joint_orient(&mut scene).unwrap();
    assert!(!orient.approx_eq(&Transform::identity(), 1e-6));
    assert_eq!(scene.get_attribute(HAND, "rotSpaceHead").unwrap(), 0.0);

    let mut flaky = FlakyScene(scene);
    let err = head.match_control_to_locator(&mut flaky, &KeyOptions::default());
    assert!(matches!(err, Err(SpaceError::Query(SceneError::Singular(_)))));
    assert_eq!(flaky.get_attribute(HAND, "rotSpaceHead").unwrap(), 0.0);
    assert!(flaky.joint_orient(HAND).is_ok());
}

#[test]
fn selection_fans_out_over_aligned_entries() {
    let mut scene = configured_rig();
    let controls = vec![HAND.to_string(), FOOT.to_string()];
    let intersection = Intersection::from_controls(&scene, &controls).unwrap();

    let names = intersection.spaces().unwrap().names();
    assert_eq!(names, vec!["Rig", "Space Chest", "Space World"]);
    assert!(intersection.rotation_spaces().is_none());

    let world = intersection.entry(GroupKind::Spaces, "Space World").unwrap();
    world.switch_to_space(&mut scene, &KeyOptions::keyed()).unwrap();
    assert_eq!(scene.get_attribute(HAND, "spaceWorld").unwrap(), 1.0);
    assert_eq!(scene.get_attribute(FOOT, "spaceWorld").unwrap(), 1.0);
    assert_eq!(scene.keyframes().len(), 2);

    let chest = intersection.entry(GroupKind::Spaces, "Space Chest").unwrap();
    chest.select_transform(&mut scene).unwrap();
    assert_eq!(
        scene.selection(),
        vec!["|rig|chest|chest_LOC".to_string(), "|rig|chest|chest_LOC".to_string()]
    );

    chest.set_attribute(&mut scene, 0.5, &KeyOptions::default()).unwrap();
    assert_eq!(scene.get_attribute(FOOT, "spaceChest").unwrap(), 0.5);
}

#[test]
fn match_to_space_pairs_members() {
    let mut scene = configured_rig();
    let controls = vec![HAND.to_string(), FOOT.to_string()];
    let intersection = Intersection::from_controls(&scene, &controls).unwrap();

    let chest = intersection.entry(GroupKind::Spaces, "Space Chest").unwrap();
    let rig = intersection.entry(GroupKind::Spaces, "Rig").unwrap();

    // The hand's "Rig" space has no locator.
    assert!(matches!(
        chest.match_to_space(&mut scene, &rig, &KeyOptions::default()),
        Err(SpaceError::NoTransform(_))
    ));

    let mut intersection = Intersection::new();
    intersection.add_spaces(Spaces::from_control(&scene, FOOT).unwrap().unwrap());
    intersection.evaluate();
    let chest = intersection.entry(GroupKind::Spaces, "Space Chest").unwrap();
    let rig = intersection.entry(GroupKind::Spaces, "Rig").unwrap();
    chest.match_to_space(&mut scene, &rig, &KeyOptions::default()).unwrap();
    assert_same_world(
        &scene.world_matrix("|rig|chest|chest_LOC").unwrap(),
        &scene.world_matrix("|rig|world_LOC").unwrap(),
    );
}

#[test]
fn match_to_space_skips_other_group_kind() {
    let mut scene = configured_rig();
    let intersection = Intersection::from_controls(&scene, &[HAND.to_string()]).unwrap();
    let before = scene.world_matrix("|rig|chest|chest_LOC").unwrap();

    let chest = intersection.entry(GroupKind::Spaces, "Space Chest").unwrap();
    let head = intersection
        .entry(GroupKind::RotationSpaces, "Rot Space Head")
        .unwrap();
    chest.match_to_space(&mut scene, &head, &KeyOptions::default()).unwrap();
    assert_same_world(&scene.world_matrix("|rig|chest|chest_LOC").unwrap(), &before);
}

#[test]
fn unconfigured_control_empties_the_intersection() {
    let scene = configured_rig();
    let controls = vec![HAND.to_string(), "|rig|chest".to_string(), FOOT.to_string()];
    let intersection = Intersection::from_controls(&scene, &controls).unwrap();
    assert!(intersection.spaces().is_none());
    assert!(intersection.rotation_spaces().is_none());
    assert!(intersection.entries(GroupKind::Spaces).is_empty());
    assert_eq!(intersection.len(), 2);
}

#[test]
fn invalid_stored_config_is_reported() {
    let mut scene = configured_rig();
    let broken = r#"{ "Spaces": { "Definitions": [
        { "name": "Rig", "transformName": "|rig|gone_LOC" }
    ] } }"#;
    scene.set_string_attribute(FOOT, CONFIG_ATTRIBUTE, broken).unwrap();

    let controls = vec![HAND.to_string(), FOOT.to_string()];
    let err = Intersection::from_controls(&scene, &controls).unwrap_err();
    assert!(matches!(err, ConfigError::NoSuchTransform(ref path) if path == "|rig|gone_LOC"));
}

#[test]
fn facade_matches_every_member() {
    let mut scene = configured_rig();
    let controls = vec![HAND.to_string(), FOOT.to_string()];
    let intersection = Intersection::from_controls(&scene, &controls).unwrap();
    let foot_before = scene.world_matrix(FOOT).unwrap();

    let world = intersection.entry(GroupKind::Spaces, "Space World").unwrap();
    // The foot's "Space World" has no locator.
    assert!(world.match_to_control(&mut scene, &KeyOptions::default()).is_err());

    let chest = intersection.entry(GroupKind::Spaces, "Space Chest").unwrap();
    chest.match_to_control(&mut scene, &KeyOptions::default()).unwrap();
    chest
        .match_control_to_space(&mut scene, &KeyOptions::default())
        .unwrap();
    assert_same_world(&scene.world_matrix(FOOT).unwrap(), &foot_before);

    chest.zero_transform(&mut scene, &KeyOptions::default()).unwrap();
    assert!(scene
        .local_matrix("|rig|chest|chest_LOC")
        .unwrap()
        .approx_eq(&Transform::identity(), 1e-12));
}

#[test]
fn stored_configuration_reloads() {
    let scene = configured_rig();
    assert!(scene.has_attribute(HAND, CONFIG_ATTRIBUTE));
    let spaces = Spaces::from_control(&scene, HAND).unwrap().unwrap();
    assert_eq!(spaces, hand(&scene));
    assert_eq!(spaces.rotation_spaces().unwrap().len(), 3);
}
