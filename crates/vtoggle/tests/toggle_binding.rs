use vtoggle::{
    apply_edits, parse_sfc, toggle_binding_actions, CancelToken, LineIndex, LinePosition, Span,
    ToggleAction, ToggleKind,
};

fn component(template: &str) -> String {
    format!(
        "<script setup lang=\"ts\">\nconst label = '<template>'\n</script>\n\n<template>\n{template}\n</template>\n\n<style scoped>\np {{ color: red; }}\n</style>\n"
    )
}

fn caret_in(text: &str, needle: &str) -> Span {
    let start = text.find(needle).expect("needle exists");
    Span::empty(start + 1)
}

fn actions_at(text: &str, selection: Span) -> Vec<ToggleAction> {
    let document = parse_sfc(text);
    toggle_binding_actions(&document, selection, &CancelToken::new())
}

fn toggle_once(text: &str, selection: Span) -> String {
    let actions = actions_at(text, selection);
    assert_eq!(actions.len(), 1, "{actions:#?}");
    apply_edits(text, &actions[0].edits)
}

#[test]
fn removes_binding_from_string_literal() {
    let text = component(r#"  <input :type="'password'" />"#);
    let actions = actions_at(&text, caret_in(&text, "type"));
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ToggleKind::RemoveBinding);
    assert_eq!(actions[0].edits.len(), 3);
    let edited = apply_edits(&text, &actions[0].edits);
    assert_eq!(edited, component(r#"  <input type="password" />"#));
}

#[test]
fn removes_binding_with_and_without_leading_trivia() {
    let text = component(r#"<p :title="  /*c*/ 'value'  "></p>"#);
    let edited = toggle_once(&text, caret_in(&text, ":title"));
    assert_eq!(edited, component(r#"<p title="value"></p>"#));

    let text = component(r#"<p :title="'value'"></p>"#);
    let edited = toggle_once(&text, caret_in(&text, ":title"));
    assert_eq!(edited, component(r#"<p title="value"></p>"#));
}

#[test]
fn adds_binding_to_valueless_attribute_with_cursor() {
    let text = component("<input disabled>");
    let actions = actions_at(&text, caret_in(&text, "disabled"));
    assert_eq!(actions.len(), 1);
    let action = &actions[0];
    assert_eq!(action.kind, ToggleKind::AddBinding);
    let edited = apply_edits(&text, &action.edits);
    assert_eq!(edited, component(r#"<input :disabled="">"#));

    let cursor = action.cursor.expect("cursor between the new quotes");
    assert_eq!(&edited[cursor - 1..cursor + 1], "\"\"");
    let index = LineIndex::new(&edited);
    let line = edited[..cursor].matches('\n').count() as u32;
    assert_eq!(index.position_at(cursor), LinePosition::new(line, 18));
}

#[test]
fn adds_binding_to_attribute_with_value() {
    let text = component(r#"<input type="text">"#);
    let actions = actions_at(&text, caret_in(&text, "type"));
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].cursor, None);
    assert_eq!(actions[0].edits.len(), 1);
    assert_eq!(
        apply_edits(&text, &actions[0].edits),
        component(r#"<input :type="text">"#)
    );
}

#[test]
fn binding_prefix_round_trips() {
    let original = component(r#"<a title="'docs'">x</a>"#);
    let bound = toggle_once(&original, caret_in(&original, "title"));
    assert_eq!(bound, component(r#"<a :title="'docs'">x</a>"#));
    let unbound = toggle_once(&bound, caret_in(&bound, "title"));
    assert_eq!(unbound, component(r#"<a title="docs">x</a>"#));
    let rebound = toggle_once(&unbound, caret_in(&unbound, "title"));
    assert_eq!(rebound, component(r#"<a :title="docs">x</a>"#));
}

#[test]
fn non_literal_bindings_offer_nothing() {
    for (binding, needle) in [
        (r#"<p :title="foo"></p>"#, ":title"),
        (r#"<p :title="'a' + 'b'"></p>"#, ":title"),
        (r#"<p :title="1"></p>"#, ":title"),
        (r#"<p :title="a; b"></p>"#, ":title"),
        (r#"<p :title="`hi ${name}`"></p>"#, ":title"),
        (r#"<p @click="'x'"></p>"#, "@click"),
    ] {
        let text = component(binding);
        assert!(
            actions_at(&text, caret_in(&text, needle)).is_empty(),
            "{binding} should not be toggleable"
        );
    }
}

#[test]
fn nested_elements_contribute_in_traversal_order() {
    let text = component(r#"<ul class="list"><li :key="'a'" hidden>x</li></ul>"#);
    let start = text.find("<ul").expect("ul");
    let end = text.find("</ul>").expect("end") + "</ul>".len();
    // A selection covering whole elements is not inside any attribute.
    assert!(actions_at(&text, Span::new(start, end)).is_empty());

    let key = caret_in(&text, ":key");
    let actions = actions_at(&text, key);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ToggleKind::RemoveBinding);
}

#[test]
fn empty_inputs_yield_no_actions() {
    assert!(actions_at("", Span::empty(0)).is_empty());
    assert!(actions_at("<script>export default {}</script>", Span::empty(3)).is_empty());

    let text = component("<input disabled>");
    let in_script = caret_in(&text, "label");
    assert!(actions_at(&text, in_script).is_empty());
    let in_style = caret_in(&text, "color");
    assert!(actions_at(&text, in_style).is_empty());

    let pug = "<template lang=\"pug\">\ninput(disabled)\n</template>\n";
    assert!(actions_at(pug, caret_in(pug, "disabled")).is_empty());
}

#[test]
fn straddling_selection_yields_nothing() {
    let text = component(r#"<input type="text" disabled>"#);
    let start = text.find("text").expect("text");
    let end = text.find("disabled").expect("disabled") + 3;
    assert!(actions_at(&text, Span::new(start, end)).is_empty());
}

#[test]
fn actions_serialize_with_stable_kind() {
    let text = component("<input disabled>");
    let actions = actions_at(&text, caret_in(&text, "disabled"));
    let json = serde_json::to_value(&actions[0]).expect("serializes");
    assert_eq!(json["title"], "Add v-bind to attribute");
    assert_eq!(json["kind"], ToggleKind::AddBinding.tag());
    assert_eq!(json["kind"], "toggle-binding/add");
    assert_eq!(ToggleKind::AddBinding.tag(), "toggle-binding/add");
}

#[test]
fn lookalike_and_commented_close_tags_keep_the_template_open() {
    for text in [
        "<template>\n<TemplateList>x</TemplateList>\n<p :title=\"'x'\"></p>\n</template>\n",
        "<template>\n<!-- </template> -->\n<p :title=\"'x'\"></p>\n</template>\n",
    ] {
        let edited = toggle_once(text, caret_in(text, ":title"));
        assert!(edited.contains(r#"<p title="x"></p>"#), "{edited}");
    }
}
