//! Per-request message templates

pub const RESOLVE_TICKER: &str = "user/resolve_ticker";
pub const ANALYZE: &str = "user/analyze";
pub const READ_CHART: &str = "user/read_chart";
pub const ANALYZE_DOCUMENT: &str = "user/analyze_document";

pub(super) const TEMPLATES: &[(&str, &str)] = &[
    (RESOLVE_TICKER, RESOLVE_TICKER_TEMPLATE),
    (ANALYZE, ANALYZE_TEMPLATE),
    (READ_CHART, READ_CHART_TEMPLATE),
    (ANALYZE_DOCUMENT, ANALYZE_DOCUMENT_TEMPLATE),
];

const RESOLVE_TICKER_TEMPLATE: &str = r#"Identify the stock this {{ modality }} is about.
{% if content %}
---
{{ content }}
---
{% endif %}"#;

const ANALYZE_TEMPLATE: &str = r#"Produce the {{ kind | lower }} for {{ ticker }}.

Last price: {{ price }} {{ currency }} (as of {{ as_of }})
{% if company %}Company: {{ company }}
{% endif %}
Metrics:
{% for m in metrics %}- {{ m.name }}: {{ m.value }}
{% endfor %}
{% if missing %}Not available: {{ missing | join(", ") }}
{% endif %}"#;

const READ_CHART_TEMPLATE: &str = r#"Read this chart.{% if question %} The user asked: "{{ question }}"{% endif %}"#;

const ANALYZE_DOCUMENT_TEMPLATE: &str = r#"Analyse the following document{% if title %} titled "{{ title }}"{% endif %}{% if ticker %} (ticker {{ ticker }}){% endif %}.

---
{{ text }}
---"#;
