#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Avoid pathological allocations in the harness itself; libFuzzer will still mutate below this.
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let document = vtoggle::parse_sfc(&src);
    for diag in &document.diagnostics {
        assert!(diag.span.start <= diag.span.end && diag.span.end <= src.len());
    }
    let (ast, _) = vtoggle::parse_template(&src);
    for element in ast.elements() {
        for attribute in &element.attributes {
            assert!(element.span.contains_span(attribute.span()));
        }
    }
});
