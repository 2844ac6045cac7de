//! HTML page for browser clients.

use crate::app::strings::StringsResponse;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(strings: &StringsResponse) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Random String Generator</title>
</head>
<body>
  <h1>Random String Generator</h1>
  <section>
    <h2>Printable String</h2>
    <p>Length: {printable_len}</p>
    <code id="printable-string">{printable}</code>
  </section>
  <section>
    <h2>Alphanumeric String</h2>
    <p>Length: {alnum_len}</p>
    <code id="alphanumeric-string">{alnum}</code>
  </section>
  <p><a href="/json?p={printable_len}&amp;a={alnum_len}">JSON</a></p>
</body>
</html>
"#,
        printable_len = strings.printable.length,
        printable = escape(&strings.printable.string),
        alnum_len = strings.alphanumeric.length,
        alnum = escape(&strings.alphanumeric.string),
    )
}
