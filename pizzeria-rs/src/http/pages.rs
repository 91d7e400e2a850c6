//! Server-rendered pages. Markup is intentionally minimal and built by hand;
//! rendering is not this crate's point and no template engine is pulled in.

use crate::auth::SessionUser;
use crate::store::Pizza;

/// Catalog listing shown on `/` with the logged-in user's identity.
pub fn catalog_page(user: &SessionUser, pizzas: &[Pizza]) -> String {
    let mut items = String::new();
    if pizzas.is_empty() {
        items.push_str("<p>No pizzas yet.</p>");
    } else {
        items.push_str("<ul class=\"catalog\">");
        for pizza in pizzas {
            items.push_str(&format!(
                "<li><strong>{}</strong> &mdash; {} <em>{}</em></li>",
                escape(&pizza.name),
                pizza.price,
                escape(&pizza.description),
            ));
        }
        items.push_str("</ul>");
    }

    page(
        "Pizzeria",
        &format!(
            "<h1>Pizzeria</h1>\
             <p>Welcome, {}! <a href=\"/logout\">Log out</a></p>\
             {items}",
            escape(&user.name),
        ),
    )
}

pub fn signup_page() -> String {
    page(
        "Sign up",
        "<h1>Sign up</h1>\
         <form method=\"post\" action=\"/signup\">\
         <label>Name <input type=\"text\" name=\"name\" required></label>\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Sign up</button>\
         </form>\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
    )
}

pub fn login_page() -> String {
    page(
        "Log in",
        "<h1>Log in</h1>\
         <form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Log in</button>\
         </form>\
         <p>New here? <a href=\"/signup\">Sign up</a></p>",
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\
         <html lang=\"en\">\
         <head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body>{body}</body>\
         </html>",
        escape(title),
    )
}

/// Escape text for interpolation into HTML content and attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
