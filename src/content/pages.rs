//! Server-rendered HTML pages.
//!
//! Every page shares one layout (header navigation, footer, disclaimer); the
//! calculator pages embed a form that `app.js` submits to the JSON API and an
//! initial result table computed from the form defaults.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

use super::blog::{BlogCategory, BlogPost, posts_in_category, posts_newest_first, related_posts};
use super::forms::{FieldKind, FormField, Unit, calculator_form};
use super::loan_options::{LoanOption, loan_options, options_for_calculator};
use super::navigation::{COMPANY, NavLink, footer_sections, header_links};
use crate::core::{Calculator, CalculatorResult};

fn nav_item(out: &mut String, link: &NavLink, path: &str) {
    let class = if link.is_active(path) { " class=\"active\"" } else { "" };
    let _ = write!(
        out,
        "<li{class}><a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(link.href),
        encode_text(link.label)
    );
    if !link.children.is_empty() {
        out.push_str("<ul class=\"submenu\">");
        for child in link.children {
            nav_item(out, child, path);
        }
        out.push_str("</ul>");
    }
    out.push_str("</li>");
}

/// Wraps `body` in the shared document shell. `path` marks the active nav item.
pub fn layout(title: &str, path: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 4_096);
    let _ = write!(
        out,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | {}</title>\n\
         <link rel=\"stylesheet\" href=\"/theme.css\">\n\
         <link rel=\"stylesheet\" href=\"/styles.css\">\n\
         <script src=\"/app.js\" defer></script>\n</head>\n<body>\n",
        encode_text(title),
        encode_text(COMPANY.name)
    );

    let _ = write!(
        out,
        "<header class=\"site-header\"><a class=\"brand\" href=\"/\">{}</a><nav><ul>",
        encode_text(COMPANY.name)
    );
    for link in header_links() {
        nav_item(&mut out, link, path);
    }
    let _ = write!(
        out,
        "</ul></nav><a class=\"cta\" href=\"tel:{}\">{}</a></header>\n<main>\n",
        encode_double_quoted_attribute(&COMPANY.phone.replace(|c: char| !c.is_ascii_digit(), "")),
        encode_text(COMPANY.phone)
    );
    out.push_str(body);
    out.push_str("\n</main>\n<footer class=\"site-footer\"><div class=\"footer-sections\">");
    for section in footer_sections() {
        let _ = write!(out, "<section><h4>{}</h4><ul>", encode_text(section.title));
        for link in section.links {
            let _ = write!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(link.href),
                encode_text(link.label)
            );
        }
        out.push_str("</ul></section>");
    }
    let _ = write!(
        out,
        "</div><address>{name}<br>NMLS #{nmls}<br>{address}<br>\
         <a href=\"mailto:{email}\">{email}</a> &middot; {phone}</address>\
         <p class=\"disclaimer\">{disclaimer}</p></footer>\n</body>\n</html>\n",
        name = encode_text(COMPANY.name),
        nmls = encode_text(COMPANY.nmls_id),
        address = encode_text(COMPANY.address),
        email = encode_text(COMPANY.email),
        phone = encode_text(COMPANY.phone),
        disclaimer = encode_text(COMPANY.disclaimer),
    );
    out
}

fn loan_option_card(out: &mut String, option: &LoanOption) {
    let _ = write!(
        out,
        "<article class=\"card\"><h3><a href=\"{}\">{}</a></h3><p>{}</p></article>",
        encode_double_quoted_attribute(&option.path()),
        encode_text(option.name),
        encode_text(option.tagline)
    );
}

fn post_card(out: &mut String, post: &BlogPost) {
    let _ = write!(
        out,
        "<article class=\"card\"><p class=\"meta\">{} &middot; {}</p>\
         <h3><a href=\"{}\">{}</a></h3><p>{}</p></article>",
        encode_text(post.category.label()),
        encode_text(&post.display_date()),
        encode_double_quoted_attribute(&post.path()),
        encode_text(post.title),
        encode_text(post.summary)
    );
}

fn calculator_card(out: &mut String, calculator: Calculator) {
    let _ = write!(
        out,
        "<article class=\"card\"><h3><a href=\"/calculators/{}\">{}</a></h3><p>{}</p></article>",
        calculator.slug(),
        encode_text(calculator.title()),
        encode_text(calculator.summary())
    );
}

pub fn home_page() -> String {
    let mut body = String::new();
    body.push_str(
        "<section class=\"hero\"><h1>Home loans built around you</h1>\
         <p>Conventional, FHA, VA, USDA and investor financing with straightforward answers \
         and no pressure.</p>\
         <a class=\"button\" href=\"/calculators/affordability\">See what you can afford</a></section>",
    );
    body.push_str("<section><h2>Loan options</h2><div class=\"grid\">");
    for option in loan_options() {
        loan_option_card(&mut body, option);
    }
    body.push_str("</div></section><section><h2>Calculators</h2><div class=\"grid\">");
    for calculator in Calculator::ALL {
        calculator_card(&mut body, calculator);
    }
    body.push_str("</div></section><section><h2>Latest from the blog</h2><div class=\"grid\">");
    for post in posts_newest_first().into_iter().take(3) {
        post_card(&mut body, post);
    }
    body.push_str("</div></section>");
    layout("Mortgage Loans", "/", &body)
}

pub fn loan_options_page() -> String {
    let mut body = String::from("<h1>Loan Options</h1><div class=\"grid\">");
    for option in loan_options() {
        loan_option_card(&mut body, option);
    }
    body.push_str("</div>");
    layout("Loan Options", "/loan-options", &body)
}

pub fn loan_option_page(option: &LoanOption) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><p class=\"lead\">{}</p><p>{}</p><h2>Highlights</h2><ul>",
        encode_text(option.name),
        encode_text(option.tagline),
        encode_text(option.summary)
    );
    for highlight in option.highlights {
        let _ = write!(body, "<li>{}</li>", encode_text(highlight));
    }
    let _ = write!(
        body,
        "</ul><p><strong>Ideal for:</strong> {}</p>",
        encode_text(option.ideal_for)
    );
    if let Some(min) = option.minimum_down_payment_percent() {
        let _ = write!(body, "<p><strong>Minimum down payment:</strong> {min}%</p>");
    }
    if let Some(calculator) = option.calculator {
        let _ = write!(
            body,
            "<a class=\"button\" href=\"/calculators/{}\">Try the {}</a>",
            calculator.slug(),
            encode_text(calculator.title())
        );
    }
    layout(option.name, &option.path(), &body)
}

pub fn blog_index_page(category: Option<BlogCategory>) -> String {
    let mut body = String::from("<h1>Mortgage Blog</h1><nav class=\"filters\">");
    let _ = write!(
        body,
        "<a href=\"/blog\"{}>All</a>",
        if category.is_none() { " class=\"active\"" } else { "" }
    );
    for c in BlogCategory::ALL {
        let _ = write!(
            body,
            "<a href=\"/blog?category={}\"{}>{}</a>",
            c.slug(),
            if category == Some(c) { " class=\"active\"" } else { "" },
            encode_text(c.label())
        );
    }
    body.push_str("</nav><div class=\"grid\">");
    let posts = match category {
        Some(c) => posts_in_category(c),
        None => posts_newest_first(),
    };
    if posts.is_empty() {
        body.push_str("<p>No posts in this category yet.</p>");
    }
    for post in posts {
        post_card(&mut body, post);
    }
    body.push_str("</div>");
    layout("Blog", "/blog", &body)
}

pub fn blog_post_page(post: &BlogPost) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<article class=\"post\"><h1>{}</h1><p class=\"meta\">By {} &middot; {} &middot; {} min read</p>",
        encode_text(post.title),
        encode_text(post.author),
        encode_text(&post.display_date()),
        post.reading_minutes()
    );
    for paragraph in post.paragraphs {
        let _ = write!(body, "<p>{}</p>", encode_text(paragraph));
    }
    body.push_str("<p class=\"tags\">");
    for tag in post.tags {
        let _ = write!(body, "<span class=\"tag\">{}</span>", encode_text(tag));
    }
    body.push_str("</p></article>");

    let related = related_posts(post, 3);
    if !related.is_empty() {
        body.push_str("<section><h2>Related posts</h2><div class=\"grid\">");
        for other in related {
            post_card(&mut body, other);
        }
        body.push_str("</div></section>");
    }
    layout(post.title, &post.path(), &body)
}

pub fn calculators_page() -> String {
    let mut body = String::from("<h1>Mortgage Calculators</h1><div class=\"grid\">");
    for calculator in Calculator::ALL {
        calculator_card(&mut body, calculator);
    }
    body.push_str("</div>");
    layout("Calculators", "/calculators", &body)
}

fn form_field(out: &mut String, field: &FormField) {
    let name = encode_double_quoted_attribute(field.name);
    let label = encode_text(field.label);
    let _ = write!(out, "<div class=\"field\" data-field=\"{name}\">");
    match &field.kind {
        FieldKind::Number {
            min,
            max,
            step,
            unit,
        } => {
            let suffix = match unit {
                Unit::Currency => " ($)",
                Unit::Percent => " (%)",
                Unit::Years => " (years)",
            };
            let _ = write!(
                out,
                "<label for=\"{name}\">{label}{suffix}</label>\
                 <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
                 step=\"{step}\" value=\"{}\" inputmode=\"decimal\">",
                encode_double_quoted_attribute(&field.default_value)
            );
        }
        FieldKind::Select { options } => {
            let _ = write!(
                out,
                "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">"
            );
            for option in options {
                let selected = if option.value == field.default_value {
                    " selected"
                } else {
                    ""
                };
                let _ = write!(
                    out,
                    "<option value=\"{}\"{selected}>{}</option>",
                    encode_double_quoted_attribute(option.value),
                    encode_text(option.label)
                );
            }
            out.push_str("</select>");
        }
        FieldKind::Checkbox => {
            let checked = if field.default_value == "true" { " checked" } else { "" };
            let _ = write!(
                out,
                "<label class=\"checkbox\"><input type=\"checkbox\" id=\"{name}\" name=\"{name}\" \
                 value=\"true\"{checked}> {label}</label>"
            );
        }
    }
    if let Some(help) = field.help {
        let _ = write!(out, "<small>{}</small>", encode_text(help));
    }
    out.push_str("<p class=\"error\" role=\"alert\"></p></div>");
}

/// `<table>` of calculator results; shared by the page and the no-script fallback.
pub fn results_table(results: &[CalculatorResult]) -> String {
    let mut out = String::from("<table class=\"results\"><tbody>");
    for result in results {
        let class = if result.highlight { " class=\"highlight\"" } else { "" };
        let _ = write!(
            out,
            "<tr{class}><th scope=\"row\">{}</th><td>{}</td></tr>",
            encode_text(&result.label),
            encode_text(&result.display_value())
        );
        if let Some(description) = &result.description {
            let _ = write!(
                out,
                "<tr class=\"description\"><td colspan=\"2\">{}</td></tr>",
                encode_text(description)
            );
        }
    }
    out.push_str("</tbody></table>");
    out
}

pub fn calculator_page(calculator: Calculator, initial: &[CalculatorResult]) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><p class=\"lead\">{}</p><div class=\"calculator\">\
         <form class=\"calculator-form\" data-calculator=\"{slug}\" method=\"get\" \
         action=\"/api/calculators/{slug}\" novalidate>",
        encode_text(calculator.title()),
        encode_text(calculator.summary()),
        slug = calculator.slug(),
    );
    for field in calculator_form(calculator) {
        form_field(&mut body, &field);
    }
    body.push_str(
        "<button type=\"submit\">Calculate</button><p class=\"form-error\" role=\"alert\"></p>\
         </form><section class=\"calculator-results\" aria-live=\"polite\">",
    );
    body.push_str(&results_table(initial));
    body.push_str("</section></div>");

    let related: Vec<_> = options_for_calculator(calculator).collect();
    if !related.is_empty() {
        body.push_str("<section><h2>Related loan options</h2><div class=\"grid\">");
        for option in related {
            loan_option_card(&mut body, option);
        }
        body.push_str("</div></section>");
    }
    let _ = write!(
        body,
        "<p class=\"disclaimer\">{}</p>",
        encode_text(COMPANY.disclaimer)
    );
    layout(calculator.title(), &format!("/calculators/{}", calculator.slug()), &body)
}

pub fn not_found_page(path: &str) -> String {
    let body = format!(
        "<h1>Page not found</h1><p>We couldn't find <code>{}</code>.</p>\
         <p><a href=\"/\">Back to the home page</a></p>",
        encode_text(path)
    );
    layout("Not Found", path, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{find_loan_option, find_post};
    use crate::core::Validate;

    #[test]
    fn help_text_and_attributes_are_escaped() {
        let field = FormField {
            name: "homePrice",
            label: "Price <approx>",
            kind: FieldKind::Number {
                min: 0.0,
                max: 1.0,
                step: 1.0,
                unit: Unit::Currency,
            },
            default_value: "\"1\" & more".to_string(),
            help: Some("Tom & Jerry's <b>"),
        };
        let mut html = String::new();
        form_field(&mut html, &field);
        assert!(html.contains("Price &lt;approx&gt; ($)"));
        assert!(html.contains("value=\"&quot;1&quot; &amp; more\""));
        assert!(html.contains("<small>Tom &amp; Jerry's &lt;b&gt;</small>"));
    }

    #[test]
    fn layout_marks_the_active_section() {
        let html = layout("Blog", "/blog", "<p>hi</p>");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<li class=\"active\"><a href=\"/blog\">Blog</a>"));
        assert!(html.contains("NMLS #2045817"));
    }

    #[test]
    fn not_found_escapes_the_path() {
        let html = not_found_page("/<script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<code><script>"));
    }

    #[test]
    fn calculator_page_has_a_form_and_results() {
        let calculator = Calculator::Dscr;
        let inputs = calculator.default_inputs();
        assert!(inputs.validate().is_ok());
        let results = inputs.calculate().expect("defaults");
        let html = calculator_page(calculator, &results);
        assert!(html.contains("data-calculator=\"dscr\""));
        assert!(html.contains("name=\"monthlyRent\""));
        assert!(html.contains("<tr class=\"highlight\"><th scope=\"row\">DSCR</th>"));
        assert!(html.contains("/loan-options/dscr"));
    }

    #[test]
    fn detail_pages_render_their_content() {
        let option = find_loan_option("va-purchase").expect("option");
        let html = loan_option_page(option);
        assert!(html.contains("No down payment required"));
        assert!(html.contains("/calculators/va-purchase"));

        let post = find_post("fha-vs-conventional").expect("post");
        let html = blog_post_page(post);
        assert!(html.contains("FHA vs. Conventional"));
        assert!(html.contains("February 20, 2024"));
    }

    #[test]
    fn blog_index_filters_by_category() {
        let html = blog_index_page(Some(BlogCategory::VaLoans));
        assert!(html.contains("The VA Funding Fee, Explained"));
        assert!(!html.contains("DSCR Loans: Qualifying on Rental Income"));
    }
}
