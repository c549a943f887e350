//! HTML page rendering.
//!
//! The form is built from the loaded bundle's vocabularies, so the choices
//! offered always match what the encoders accept.

use crate::features::FEATURE_NAMES;
use crate::models::{ModelBundle, Verdict};

const PAGE_STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #222; }
    h1 { font-size: 1.4rem; }
    form { display: grid; grid-template-columns: repeat(2, 1fr); gap: 0.5rem 1.5rem; }
    label { display: flex; flex-direction: column; font-size: 0.85rem; }
    select { margin-top: 0.2rem; padding: 0.3rem; }
    button { grid-column: 1 / -1; margin-top: 1rem; padding: 0.6rem; font-size: 1rem; cursor: pointer; }
    .verdict { font-size: 2rem; margin: 2rem 0; }
    .edible { color: #1a7f37; }
    .poisonous { color: #c0392b; }
"#;

/// Render the attribute form from the bundle's vocabularies.
pub fn form_page(bundle: &ModelBundle) -> String {
    let mut inputs = String::new();
    for (index, &name) in FEATURE_NAMES.iter().enumerate() {
        let mut options = String::new();
        for code in bundle.extractor.vocabulary(index) {
            options.push_str(&format!("<option value=\"{code}\">{code}</option>"));
        }
        inputs.push_str(&format!(
            "<label>{label}<select name=\"{name}\">{options}</select></label>",
            label = display_name(name),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Mushroom Classifier</title>
<style>{PAGE_STYLE}</style>
</head>
<body>
<h1>Mushroom Classifier</h1>
<p>Select the attributes of the mushroom and submit for an edibility verdict.</p>
<form action="/predict" method="post">
{inputs}
<button type="submit">Classify</button>
</form>
</body>
</html>"#
    )
}

/// Render the result page for a verdict.
pub fn result_page(verdict: Verdict) -> String {
    let class = match verdict {
        Verdict::Edible => "edible",
        Verdict::Poisonous => "poisonous",
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Prediction Result</title>
<style>{PAGE_STYLE}</style>
</head>
<body>
<h1>Prediction Result</h1>
<p class="verdict {class}">{verdict}</p>
<p><a href="/">Classify another mushroom</a></p>
</body>
</html>"#
    )
}

/// Human-readable form of a canonical field name.
fn display_name(name: &str) -> String {
    let spaced = name.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}
