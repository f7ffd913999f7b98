use plexmark_core::{ParseWarning, PropertyValue, RenderError};
use plexmark_render::transform::restructure;
use plexmark_render::{OutputFormat, RenderOptions, Renderer, render};
use pretty_assertions::assert_eq;

fn html(source: &str) -> String {
    render(source, &RenderOptions::default()).unwrap().output
}

fn with_props() -> RenderOptions {
    RenderOptions {
        with_props: true,
        ..RenderOptions::default()
    }
}

#[test]
fn strong_paragraph() {
    assert_eq!(
        html("This is a **test** document."),
        "<p>This is a <strong>test</strong> document.</p>"
    );
}

#[test]
fn quotes_and_dashes() {
    assert_eq!(
        html("\"This is a quote\" -- Gandhi"),
        "<p>&ldquo;This is a quote&rdquo; &mdash; Gandhi</p>"
    );
}

#[test]
fn unbalanced_quote_stays_literal() {
    assert_eq!(html("a \"dangling quote"), "<p>a &quot;dangling quote</p>");
}

#[test]
fn typography_can_be_disabled() {
    let options = RenderOptions {
        enable_typography: false,
        ..RenderOptions::default()
    };
    assert_eq!(
        render("\"a\" -- b", &options).unwrap().output,
        "<p>&quot;a&quot; -- b</p>"
    );
}

#[test]
fn output_is_trimmed_with_or_without_typography() {
    let plain = RenderOptions {
        enable_typography: false,
        ..RenderOptions::default()
    };
    let source = "First.\n\nSecond.";
    let output = render(source, &plain).unwrap().output;
    assert!(!output.ends_with('\n'));
    assert_eq!(output, html(source));
}

#[test]
fn literal_regions_keep_straight_quotes() {
    let output = html("Use `\"x\" -- y` here.\n\n```\n\"a\" -- b\n```");
    assert!(output.contains("<tt class=\"docutils literal\">&quot;x&quot; -- y</tt>"));
    assert!(output.contains("<pre class=\"literal-block\">\n&quot;a&quot; -- b\n</pre>"));
}

#[test]
fn wiki_links() {
    assert_eq!(
        html("See [[Home Page]] and [[Setup Guide|the guide]]."),
        "<p>See <a href=\"home-page.html\">Home Page</a> and <a href=\"setup-guide.html\">the guide</a>.</p>"
    );
}

#[test]
fn props_hold_fields_title_and_subtitle() {
    let source = "# The Title\n\n## The Subtitle\n\n:Author: tav\n:Some-Field: some value\n\nBody text.";
    let rendered = render(source, &with_props()).unwrap();
    let props = rendered.props.unwrap();
    assert_eq!(
        props.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["author", "some-field", "subtitle", "title"]
    );
    assert_eq!(props["title"], PropertyValue::Single("The Title".into()));
    assert_eq!(props["subtitle"], PropertyValue::Single("The Subtitle".into()));
    assert_eq!(props["some-field"].as_str(), Some("some value"));
    assert_eq!(rendered.output, "<p>Body text.</p>");
}

#[test]
fn props_are_serialized_as_strings_and_lists() {
    let rendered = render(":Tag: a\n:Tag: b\n\nText.", &with_props()).unwrap();
    let json = serde_json::to_value(&rendered).unwrap();
    assert_eq!(json["props"]["tag"], serde_json::json!(["a", "b"]));
    assert_eq!(json["props"]["title"], serde_json::json!(""));
}

#[test]
fn private_fields_are_hidden() {
    let source = ":Author: tav\n:X-Secret: hidden\n\nBody.";
    let rendered = render(source, &with_props()).unwrap();
    assert_eq!(rendered.props.unwrap()["x-secret"].as_str(), Some("hidden"));

    let options = RenderOptions {
        with_docinfo: true,
        ..RenderOptions::default()
    };
    let output = render(source, &options).unwrap().output;
    assert!(output.contains("tav"));
    assert!(!output.contains("Secret"));
    assert!(!output.contains("hidden"));
}

#[test]
fn duplicate_tag_id_fails_within_a_call() {
    let source = ".. tag:: id:intro\n\n   One.\n\n.. tag:: id:intro\n\n   Two.";
    let err = render(source, &RenderOptions::default()).unwrap_err();
    match err {
        RenderError::Directive { name, message, .. } => {
            assert_eq!(name, "tag");
            assert_eq!(message, "The tag id 'list-intro' has already been used!");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn same_tag_id_in_separate_calls() {
    let source = ".. tag:: id:intro\n\n   One.";
    let renderer = Renderer::default();
    let first = renderer.render(source).unwrap();
    let second = renderer.render(source).unwrap();
    assert_eq!(first.output, second.output);
    assert!(first.output.contains("id=\"tag-ref-list-intro\""));
}

#[test]
fn tag_markers_are_sorted_and_counted() {
    let source = ".. tag:: zeta, alpha\n\n   First.\n\n.. tag:: beta\n\n   Second.";
    let output = html(source);
    assert!(output.contains("id=\"tag-ref-list-temp-1-main\""));
    assert!(output.contains("id=\"tag-ref-list-temp-2-main\""));
    let alpha = output.find(">ALPHA</span>").unwrap();
    let zeta = output.find(">ZETA</span>").unwrap();
    assert!(alpha < zeta);
    assert!(output.contains("<ul id=\"tag-ref-list-temp-1-content\">\n<li><p>First.</p>\n</li>"));
}

#[test]
fn plan_namespaces_tag_ids() {
    let source = ".. plan:: alpha\n\n.. tag:: dep:build\n\n   Work.\n\n.. plan:: beta\n\n.. tag:: x\n\n   More.";
    let output = html(source);
    assert_eq!(output.matches("id=\"plan-container\"").count(), 1);
    assert!(output.contains("id=\"tag-ref-alpha-temp-1\""));
    assert!(output.contains("tag-val-dep-alpha-build"));
    assert!(output.contains("id=\"tag-ref-beta-temp-2\""));
}

#[test]
fn repeated_dep_tag_follows_current_plan() {
    let source = ".. plan:: alpha\n\n.. tag:: dep:build\n\n   Work.\n\n.. plan:: beta\n\n.. tag:: dep:build\n\n   More.";
    let output = html(source);
    assert!(output.contains("tag-val-dep-alpha-build"));
    assert!(output.contains("tag-val-dep-beta-build"));
}

#[test]
fn unknown_syntax_language_renders_plain() {
    let rendered = render(
        ".. syntax:: no-such-language\n\n   a < b",
        &RenderOptions::default(),
    )
    .unwrap();
    assert_eq!(rendered.output, "<div class=\"syntax\"><pre>a &lt; b</pre></div>");
    assert!(matches!(
        rendered.diagnostics.warnings.as_slice(),
        [ParseWarning::UnknownLanguage { language, .. }] if language == "no-such-language"
    ));
}

#[test]
fn known_syntax_language_is_highlighted() {
    let output = html(".. syntax:: rust\n\n   fn main() {}");
    assert!(output.starts_with("<div class=\"syntax\"><pre><span class=\""));
    assert!(output.ends_with("</pre></div>"));
}

#[test]
fn unknown_directive_is_a_warning() {
    let rendered = render(".. imagemap:: map.png", &RenderOptions::default()).unwrap();
    assert!(rendered.output.contains("imagemap"));
    assert!(rendered.diagnostics.has_warnings());
}

#[test]
fn restructuring_twice_changes_nothing() {
    let source = "# Title\n\n:Abstract: Short.\n\n.. contents::\n\n## One\n\n.. figure:: pic.png\n\n   Caption.\n\n## Two\n\nText.";
    let options = RenderOptions {
        as_whole: true,
        ..RenderOptions::default()
    };
    let once = render(source, &options).unwrap().output;
    assert_eq!(restructure(&once), once);
    assert!(once.contains("<div id=\"abstract\" class=\"abstract topic\">"));
    assert!(once.contains("<div class=\"wrap3\"><img alt=\"pic.png\" src=\"pic.png\" /></div>"));
    assert!(!once.contains("<h1 class=\"title\">"));
}

#[test]
fn contents_lists_headings() {
    let output = html(".. contents::\n\n## Alpha\n\n### Inner\n\n## Beta");
    assert!(output.contains("<span id=\"document-toc\">Contents</span>"));
    assert!(output.contains("<a class=\"reference internal\" href=\"#alpha\">Alpha</a>"));
    assert!(output.contains("<a class=\"reference internal\" href=\"#inner\">Inner</a>"));
    assert!(output.contains("<h2 id=\"beta\">Beta</h2>"));
}

#[test]
fn tex_output() {
    let options = RenderOptions::with_format(OutputFormat::Tex);
    let output = render("This is a **test** document.", &options).unwrap().output;
    assert!(output.starts_with("\\setlength{\\locallinewidth}{\\linewidth}\n"));
    assert!(output.contains("This is a \\textbf{test} document."));

    let whole = RenderOptions {
        as_whole: true,
        ..options
    };
    let output = render("# Paper\n\nText.", &whole).unwrap().output;
    assert!(output.starts_with("\\documentclass[a4paper]{article}"));
    assert!(output.contains("\\title{Paper}"));
    assert!(output.contains("\\begin{document}\n\\setlength{\\locallinewidth}{\\linewidth}\n\\maketitle"));
    assert!(output.ends_with("\\end{document}\n"));
}

#[test]
fn raw_output_is_a_document_tree() {
    let options = RenderOptions::with_format(OutputFormat::Raw);
    let output = render(".. contents::\n\n## Alpha", &options).unwrap().output;
    assert!(output.starts_with("<document source=\"[dynamic-text]\">\n"));
    assert!(output.contains("    <topic classes=\"contents\" ids=\"contents\" names=\"contents\">\n"));
    assert!(output.contains("<reference internal=\"True\" refid=\"alpha\">"));
    assert!(output.contains("    <section ids=\"alpha\" names=\"alpha\">\n"));
}

#[test]
fn decodes_windows_1252() {
    let options = RenderOptions {
        encoding: "windows-1252".into(),
        ..RenderOptions::default()
    };
    let bytes: &[u8] = b"Caf\xe9 \x80";
    assert_eq!(render(bytes, &options).unwrap().output, "<p>Caf\u{e9} \u{20ac}</p>");
}

#[test]
fn unknown_encoding_fails() {
    let options = RenderOptions {
        encoding: "no-such-encoding".into(),
        ..RenderOptions::default()
    };
    let bytes: &[u8] = b"text";
    assert!(matches!(
        render(bytes, &options),
        Err(RenderError::UnknownEncoding(label)) if label == "no-such-encoding"
    ));
}

#[test]
fn invalid_format_is_rejected() {
    assert!(matches!(
        "pdf".parse::<OutputFormat>(),
        Err(RenderError::InvalidFormat(name)) if name == "pdf"
    ));
}
