//! End-to-end tests: documentation data in, declaration text out.

use docdts_core::{
    CodegenOptions, Context, DiagnosticCategory, DocFile, GenerateConfig, GenerateError,
    MemberOrigin, emit, generate, resolve_all,
};
use serde_json::{Value, json};

fn doc(value: Value) -> DocFile {
    DocFile::from_value(value).unwrap()
}

fn config() -> GenerateConfig {
    GenerateConfig {
        ambient_types: Vec::new(),
        ..Default::default()
    }
}

fn resolved(value: Value) -> Context {
    let mut ctx = Context::new(config());
    ctx.load(&doc(value)).unwrap();
    resolve_all(&mut ctx).unwrap();
    ctx
}

fn member_names(ctx: &Context, class: &str) -> Vec<String> {
    let id = ctx.find_class(class).unwrap();
    ctx.class(id)
        .members
        .values()
        .map(|m| m.name.clone())
        .collect()
}

fn ember_fixture() -> Value {
    json!({
        "classes": {
            "Ember": { "name": "Ember", "description": "The Ember namespace." },
            "Ember.Object": { "name": "Ember.Object", "extends": "Ember.CoreObject", "uses": ["Ember.Observable"] },
            "Ember.CoreObject": { "name": "Ember.CoreObject" },
            "Ember.Observable": { "name": "Ember.Observable" },
            "Ember.Route": { "name": "Ember.Route", "extends": "Ember.Object", "uses": ["Ember.Evented"] },
            "Ember.Evented": { "name": "Ember.Evented" },
            "Ember.Test.Adapter": { "name": "Ember.Test.Adapter" }
        },
        "classitems": [
            { "class": "Ember", "name": "VERSION", "itemtype": "property", "type": "String", "static": 1 },
            { "class": "Ember", "name": "typeOf", "itemtype": "method",
              "params": [{ "name": "item", "type": "Object" }], "return": { "type": "String" } },
            { "class": "Ember.CoreObject", "name": "create", "itemtype": "method", "static": true,
              "params": [{ "name": "args*", "type": "Object" }] },
            { "class": "Ember.CoreObject", "name": "destroy", "itemtype": "method", "chainable": true },
            { "class": "Ember.Observable", "name": "get", "itemtype": "method",
              "params": [{ "name": "keyName", "type": "String" }] },
            { "class": "Ember.Observable", "name": "set", "itemtype": "method",
              "params": [{ "name": "keyName", "type": "String" }, { "name": "value", "type": "Object" }] },
            { "class": "Ember.Route", "name": "transitionTo", "itemtype": "method",
              "params": [
                  { "name": "name", "type": "String" },
                  { "name": "models*", "type": "Object|String" },
                  { "name": "options", "type": "Object", "optional": true }
              ],
              "return": { "type": "Transition" } },
            { "class": "Ember.Route", "name": "model", "itemtype": "method",
              "return": { "type": "RSVP.Promise" } },
            { "class": "Ember.Evented", "name": "on", "itemtype": "method",
              "params": [{ "name": "name", "type": "String" }, { "name": "method", "type": "Function" }] },
            { "class": "Ember.Test.Adapter", "name": "asyncStart", "itemtype": "method" },
            { "class": "Ember.Route", "description": "A plain comment record." }
        ]
    })
}

#[test]
fn test_unrelated_class_keeps_direct_members() {
    let ctx = resolved(json!({
        "classes": { "Ember.Map": { "name": "Ember.Map" } },
        "classitems": [
            { "class": "Ember.Map", "name": "get", "itemtype": "method" },
            { "class": "Ember.Map", "name": "size", "itemtype": "property", "type": "Number" },
            { "class": "Ember.Map", "name": "create", "itemtype": "method", "static": true }
        ]
    }));
    assert_eq!(member_names(&ctx, "Ember.Map"), vec!["get", "size", "create"]);
}

#[test]
fn test_inherited_members_belong_to_child() {
    let ctx = resolved(ember_fixture());
    let route = ctx.find_class("Ember.Route").unwrap();
    let klass = ctx.class(route);

    for name in ["destroy", "get", "set", "on"] {
        let member = klass.member(name, false).unwrap();
        assert_eq!(member.owner, route, "{} should be attributed to Ember.Route", name);
    }
    // Statics other than the factory are not inherited.
    assert!(matches!(
        klass.member("create", true).map(|m| m.origin),
        Some(MemberOrigin::Factory(_))
    ));
}

#[test]
fn test_resolution_runs_once() {
    let mut ctx = resolved(ember_fixture());
    let before = member_names(&ctx, "Ember.Route");
    let stats = ctx.diagnostics().stats().clone();

    resolve_all(&mut ctx).unwrap();
    assert_eq!(member_names(&ctx, "Ember.Route"), before);
    assert_eq!(ctx.diagnostics().stats().mixin_members, stats.mixin_members);
    assert_eq!(
        ctx.diagnostics().stats().inherited_members,
        stats.inherited_members
    );
}

#[test]
fn test_full_output() {
    let output = generate(&doc(ember_fixture()), &config()).unwrap();
    let code = &output.code;

    // Namespace shadow members live at namespace level.
    assert!(code.contains("declare namespace Ember {\n    let VERSION: string;\n"));
    assert!(code.contains("    function typeOf(item: {}): string;\n"));
    assert!(!code.contains("class Ember "));

    // Heritage clauses are relative, except for pinned absolute names.
    assert!(code.contains("    class Object extends CoreObject implements Observable {\n"));
    assert!(code.contains("    class Route extends Ember.Object implements Evented {\n"));

    // Factory inherited from the parent returns the child type.
    assert!(code.contains("        static create(...args: {}[]): Route;\n"));
    assert!(code.contains("        static create(...args: {}[]): CoreObject;\n"));

    // Rest parameter in the middle splits into two overloads.
    assert!(code.contains(
        "        transitionTo(name: string, ...models: {}[]): Transition;\n        transitionTo(name: string): Transition;\n"
    ));

    assert!(code.contains("        model(): Promise<any>;\n"));
    assert!(code.contains("        destroy(): this;\n"));

    // Mixin members are flattened into the class body.
    assert!(code.contains("        on(name: string, method: Function): any;\n"));

    // Excluded prefixes leave no trace.
    assert!(!code.contains("Adapter"));
    assert!(!code.contains("asyncStart"));

    assert!(code.ends_with("export default Ember;\n"));
    assert_eq!(output.diagnostics.stats().excluded_records, 2);
}

#[test]
fn test_declaration_order_follows_input() {
    let output = generate(
        &doc(json!({
            "classes": {
                "Ember.Zebra": { "name": "Ember.Zebra" },
                "Ember.Apple": { "name": "Ember.Apple" },
                "Ember.Mango": { "name": "Ember.Mango" }
            }
        })),
        &config(),
    )
    .unwrap();
    let zebra = output.code.find("class Zebra").unwrap();
    let apple = output.code.find("class Apple").unwrap();
    let mango = output.code.find("class Mango").unwrap();
    assert!(zebra < apple && apple < mango);
}

#[test]
fn test_duplicate_class_is_rejected() {
    let mut ctx = Context::new(config());
    ctx.load(&doc(json!({
        "classes": {
            "Ember.View": { "name": "Ember.View", "description": "first" },
            "Em.View": { "name": "Em.View", "description": "second" }
        }
    })))
    .unwrap();

    assert_eq!(ctx.classes().count(), 1);
    let view = ctx.find_class("Ember.View").unwrap();
    assert_eq!(ctx.class(view).description.as_deref(), Some("first"));
    assert_eq!(
        ctx.diagnostics()
            .by_category(DiagnosticCategory::DuplicateClass)
            .count(),
        1
    );
}

#[test]
fn test_duplicate_member_keeps_first() {
    let ctx = resolved(json!({
        "classes": { "Ember.View": { "name": "Ember.View" } },
        "classitems": [
            { "class": "Ember.View", "name": "render", "itemtype": "method", "return": { "type": "String" } },
            { "class": "Ember.View", "name": "render", "itemtype": "method", "return": { "type": "Number" } },
            { "class": "Ember.View", "name": "render", "itemtype": "method", "static": true }
        ]
    }));
    assert_eq!(member_names(&ctx, "Ember.View"), vec!["render", "render"]);
    assert_eq!(
        ctx.diagnostics()
            .by_category(DiagnosticCategory::DuplicateMember)
            .count(),
        1
    );
}

#[test]
fn test_create_infers_declaring_class() {
    let output = generate(
        &doc(json!({
            "classes": { "Ember.Application": { "name": "Ember.Application" } },
            "classitems": [
                { "class": "Ember.Application", "name": "create", "itemtype": "method", "static": true }
            ]
        })),
        &config(),
    )
    .unwrap();
    assert!(output.code.contains("static create(): Application;"));
}

#[test]
fn test_unknown_owner_is_reported() {
    let output = generate(
        &doc(json!({
            "classes": { "Ember.View": { "name": "Ember.View" } },
            "classitems": [
                { "class": "Ember.Ghost", "name": "boo", "itemtype": "method" }
            ]
        })),
        &config(),
    )
    .unwrap();
    assert!(!output.code.contains("boo"));
    assert_eq!(
        output
            .diagnostics
            .by_category(DiagnosticCategory::UnknownClass)
            .count(),
        1
    );
}

#[test]
fn test_fatal_errors() {
    let missing_namespace = generate(
        &doc(json!({
            "classitems": [{ "class": "Nowhere.Thing", "name": "x", "itemtype": "method" }]
        })),
        &config(),
    );
    assert!(matches!(
        missing_namespace,
        Err(GenerateError::MissingNamespace(ns)) if ns == "Nowhere"
    ));

    let params_on_property = generate(
        &doc(json!({
            "classes": { "Ember.View": { "name": "Ember.View" } },
            "classitems": [{
                "class": "Ember.View", "name": "layout", "itemtype": "property",
                "params": [{ "name": "x", "type": "String" }]
            }]
        })),
        &config(),
    );
    assert!(matches!(
        params_on_property,
        Err(GenerateError::ParamsOnNonMethod { .. })
    ));

    let cycle = generate(
        &doc(json!({
            "classes": {
                "Ember.A": { "name": "Ember.A", "extends": "Ember.B" },
                "Ember.B": { "name": "Ember.B", "extends": "Ember.A" }
            }
        })),
        &config(),
    );
    match cycle {
        Err(err @ GenerateError::CyclicExtends(_)) => {
            assert_eq!(
                err.to_string(),
                "cyclic extends chain: Ember.A -> Ember.B -> Ember.A"
            );
        }
        other => panic!("expected a cycle error, got {:?}", other.map(|g| g.code)),
    }
}

#[test]
fn test_ambient_types_and_generics() {
    let output = generate(
        &doc(json!({
            "classes": {
                "Ember.NativeArray": { "name": "Ember.NativeArray", "uses": ["Ember.Enumerable"] },
                "Ember.Enumerable": { "name": "Ember.Enumerable" }
            }
        })),
        &GenerateConfig::default(),
    )
    .unwrap();
    let code = &output.code;
    assert!(code.contains("    class NativeArray<T = any> implements Enumerable, Array<T> {\n"));
    assert!(code.contains("declare interface Transition {\n}\n"));
    assert!(code.contains("declare interface JQuery {\n}\n"));
}

#[test]
fn test_emit_reads_a_context_directly() {
    let ctx = resolved(json!({
        "classes": { "DS.Model": { "name": "DS.Model" } }
    }));
    let options = CodegenOptions {
        indent: 2,
        export_name: "DS".to_string(),
        ..Default::default()
    };
    let result = emit(&ctx, &options);
    assert!(result.code.contains("declare namespace DS {\n  class Model {\n  }\n}\n"));
    assert!(result.code.ends_with("export default DS;\n"));
}

#[test]
fn test_deprecated_class_does_not_deprecate_members() {
    let output = generate(
        &doc(json!({
            "classes": {
                "Ember.OldView": {
                    "name": "Ember.OldView",
                    "deprecated": true,
                    "deprecationMessage": "Use Ember.Component"
                }
            },
            "classitems": [
                { "class": "Ember.OldView", "name": "render", "itemtype": "method",
                  "description": "Renders the view." },
                { "class": "Ember.OldView", "name": "rerender", "itemtype": "method",
                  "deprecated": true }
            ]
        })),
        &config(),
    )
    .unwrap();

    let warnings: Vec<_> = output
        .diagnostics
        .by_category(DiagnosticCategory::Deprecation)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].name, "Ember.OldView.render");

    let code = &output.code;
    assert!(code.contains("    /** @deprecated Use Ember.Component */\n    class OldView {\n"));
    assert!(code.contains("        /** Renders the view. */\n        render(): any;\n"));
    assert!(code.contains("        /** @deprecated */\n        rerender(): any;\n"));
    assert_eq!(code.matches("@deprecated").count(), 2);
}
