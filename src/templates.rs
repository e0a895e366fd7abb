pub const REPORT_HTML_TEMPLATE: &str = include_str!("../templates/report.html.hbs");
