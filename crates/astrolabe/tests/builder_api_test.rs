//! Integration tests for the ModelBuilder API
//!
//! These tests load small models from text and check the derived class plans.

use astrolabe::{
    AstrolabeError, ModelBuilder, ModelError,
    config::{AppConfig, SynthesisConfig, UnnamedRolePolicy},
    identifier::Id,
    model::{Attribute, ObjectInfo, TypeRef},
    multiplicity::Multiplicity,
    plan::PlanFile,
    synthesis::{Accessor, OperationSignature, TypeDescriptor},
};
use proptest::prelude::*;

fn plan(source: &str) -> PlanFile {
    let builder = ModelBuilder::default();
    let loaded = builder.parse(source).expect("Failed to parse");
    builder.plan(&loaded.document).expect("Failed to plan")
}

fn accessors(list: &[Accessor]) -> Vec<Accessor> {
    let mut list = list.to_vec();
    list.sort();
    list
}

fn foo_int() -> OperationSignature {
    OperationSignature {
        name: "foo".to_string(),
        param_types: vec![TypeDescriptor::Named("int".to_string())],
    }
}

#[test]
fn test_self_association_yields_both_roles() {
    let plans = plan(
        r#"
        class c_node Node;
        association as_tree aggregation {
            role a @c_node [name="parent", multiplicity="1"];
            role b @c_node [name="children", multiplicity="*"];
        }
        "#,
    );

    let node = plans.class("c_node").expect("Node should have a plan");
    assert_eq!(node.members.len(), 2);

    let parent = node.member("parent").unwrap();
    assert!(!parent.is_collection);
    assert_eq!(
        parent.accessors.iter().copied().collect::<Vec<_>>(),
        accessors(&[Accessor::Get, Accessor::Set])
    );

    let children = node.member("children").unwrap();
    assert!(children.is_collection);
    assert_eq!(
        children.accessors.iter().copied().collect::<Vec<_>>(),
        accessors(&[Accessor::List, Accessor::Add, Accessor::Remove])
    );
    assert_eq!(
        children.field_type,
        TypeDescriptor::Classifier {
            id: Id::new("c_node"),
            name: "Node".to_string()
        }
    );
}

#[test]
fn test_frozen_role_has_no_setter() {
    let plans = plan(
        r#"
        class c_order Order;
        class c_customer Customer;
        association as_placed association {
            role a @c_order [name="orders", multiplicity="*"];
            role b @c_customer [name="customer", multiplicity="1", changeability=frozen];
        }
        "#,
    );

    let customer = plans.class("c_order").unwrap().member("customer").unwrap();
    assert!(customer.accessors.contains(&Accessor::Get));
    assert!(!customer.accessors.contains(&Accessor::Set));
}

#[test]
fn test_shared_interface_operation_is_one_obligation() {
    let plans = plan(
        r#"
        interface i_one One { operation o_one foo(p_one x: "int"); }
        interface i_two Two { operation o_two foo(p_two y: "int"); }
        class c_impl Impl {
            extends @i_one;
            extends @i_two;
        }
        "#,
    );

    let obligations = &plans.class("c_impl").unwrap().obligations;
    assert_eq!(obligations.classifier_id, Id::new("c_impl"));
    assert_eq!(obligations.operations, vec![foo_int()]);
}

#[test]
fn test_diamond_excludes_inherited_implementations() {
    let plans = plan(
        r#"
        interface i_foo Foo { operation o_foo foo(p_x x: "int"); }
        interface i_bar Bar { operation o_bar bar(); }
        class c_a A { extends @i_foo; }
        class c_b B [abstract];
        class c_c C {
            extends @i_foo;
            extends @i_bar;
        }
        association g_ba generalization { role a @c_b; role b @c_a; }
        association g_cb generalization { role a @c_c; role b @c_b; }
        "#,
    );

    let operations = &plans.class("c_c").unwrap().obligations.operations;
    assert!(!operations.contains(&foo_int()));
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].to_string(), "bar()");
    assert!(plans.class("c_b").unwrap().obligations.is_empty());
}

#[test]
fn test_realization_of_interface() {
    let plans = plan(
        r#"
        interface i_shape Shape { operation o_area area(); }
        class c_circle Circle;
        association r_circle realization { role a @c_circle; role b @i_shape; }
        "#,
    );

    let circle = plans.class("c_circle").unwrap();
    assert_eq!(circle.obligations.operations[0].name, "area");
    assert!(circle.members.is_empty());
}

#[test]
fn test_shapes_model_abstract_base_satisfies_interface() {
    let plans = plan(include_str!("../../../models/shapes.astro"));

    let names = |id: &str| -> Vec<String> {
        plans
            .class(id)
            .unwrap()
            .obligations
            .operations
            .iter()
            .map(|op| op.name.clone())
            .collect()
    };
    assert_eq!(names("c_base"), vec!["area"]);
    assert_eq!(names("c_circle"), vec!["area"]);
    assert_eq!(names("c_square"), vec!["area", "scale"]);
}

#[test]
fn test_dangling_reference_becomes_unknown_type() {
    let builder = ModelBuilder::default();
    let loaded = builder
        .parse(r#"class c_a A { attribute a_b b: @c_ghost; }"#)
        .unwrap();
    assert_eq!(loaded.report.unresolved.len(), 1);

    let plans = builder.plan(&loaded.document).unwrap();
    let member = plans.class("c_a").unwrap().member("b").unwrap();
    assert_eq!(member.field_type, TypeDescriptor::Unknown(Id::new("c_ghost")));
}

#[test]
fn test_unresolved_document_is_rejected() {
    let parsed = astrolabe_parser::parse("class c_a A { attribute a_b b: @c_a; }").unwrap();

    let err = ModelBuilder::default().plan(&parsed.document).unwrap_err();
    assert!(
        matches!(
            err,
            AstrolabeError::Model(ModelError::NotResolved { id }) if id == Id::new("c_a")
        ),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_parse_error_keeps_source() {
    let err = ModelBuilder::default()
        .parse("class c_a A { attribute; }")
        .unwrap_err();

    match err {
        AstrolabeError::Parse { err, src } => {
            assert!(!err.diagnostics().is_empty());
            assert!(src.starts_with("class c_a"));
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_cache_follows_mutations() {
    let builder = ModelBuilder::default();
    let mut loaded = builder
        .parse(
            r#"
            class c_a A;
            class c_b B;
            "#,
        )
        .unwrap();
    let mut cache = builder.cache();
    builder.plan_with(&loaded.document, &mut cache).unwrap();
    let misses = cache.misses();

    let a = loaded.document.find_classifier(Id::new("c_a")).unwrap();
    loaded
        .document
        .add_attribute(
            a,
            Attribute::new(ObjectInfo::new(Id::new("a_size"), "size"), TypeRef::named("int")),
        )
        .unwrap();

    let plans = builder.plan_with(&loaded.document, &mut cache).unwrap();
    assert!(plans.class("c_a").unwrap().member("size").is_some());
    // Members and obligations of `c_a` are recomputed, `c_b` is reused.
    assert_eq!(cache.misses(), misses + 2);
    assert_eq!(cache.hits(), 2);
}

#[test]
fn test_unnamed_roles_follow_policy() {
    let source = r#"
        class c_a A;
        class c_b B;
        association as_ab association {
            role a @c_a;
            role b @c_b [multiplicity="*"];
        }
    "#;

    assert!(plan(source).class("c_a").unwrap().members.is_empty());

    let builder = ModelBuilder::new(AppConfig {
        synthesis: SynthesisConfig {
            unnamed_roles: UnnamedRolePolicy::fallback(),
        },
    });
    let loaded = builder.parse(source).unwrap();
    let plans = builder.plan(&loaded.document).unwrap();
    assert!(plans.class("c_a").unwrap().member("UnnamedRoleB_1").is_some());
    assert!(plans.class("c_b").unwrap().member("UnnamedRoleA_1").is_some());
}

#[test]
fn test_plan_keeps_model_name_and_order() {
    let plans = plan(
        r#"
        model "Shop";
        class c_z Z;
        class c_a A;
        "#,
    );

    assert_eq!(plans.model.as_deref(), Some("Shop"));
    let ids: Vec<_> = plans.classes.iter().map(|p| p.classifier.id.as_string()).collect();
    assert_eq!(ids, vec!["c_z", "c_a"]);
}

fn multiplicity() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("*".to_string()),
        (0u32..5).prop_map(|n| n.to_string()),
        (0u32..5).prop_map(|lo| format!("{lo}..*")),
        (0u32..5, 0u32..5).prop_map(|(lo, extra)| format!("{lo}..{}", lo + extra)),
    ]
}

fn changeability() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("changeable"), Just("frozen"), Just("addonly")]
}

proptest! {
    #[test]
    fn accessors_match_multiplicity(multiplicity in multiplicity(), changeability in changeability()) {
        let plans = plan(&format!(
            r#"
            class c_a A;
            class c_b B;
            association as_ab association {{
                role a @c_a [name="a"];
                role b @c_b [name="items", multiplicity="{multiplicity}", changeability={changeability}];
            }}
            "#
        ));
        let member = plans.class("c_a").unwrap().member("items").unwrap();
        let expected = Multiplicity::parse(&multiplicity).unwrap();

        prop_assert_eq!(member.multiplicity, expected);
        prop_assert_eq!(member.is_collection, expected.is_collection());
        if member.is_collection {
            prop_assert!(member.accessors.contains(&Accessor::List));
            prop_assert!(!member.accessors.contains(&Accessor::Get));
        } else {
            prop_assert!(member.accessors.contains(&Accessor::Get));
            prop_assert!(!member.accessors.contains(&Accessor::List));
            prop_assert!(!member.accessors.contains(&Accessor::Add));
        }
        prop_assert_eq!(member.accessors.contains(&Accessor::Remove), member.is_collection && changeability == "changeable");
    }
}
