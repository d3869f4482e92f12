//! Server-rendered form pages.
//!
//! Markup is deliberately minimal; usernames are the only user-controlled
//! text echoed back and are always escaped. Password inputs are never
//! pre-filled.

use std::fmt::Write;

use crate::services::FieldErrors;

use super::session::{LOGIN_PAGE, WELCOME_PAGE};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://stackpath.bootstrapcdn.com/bootstrap/4.5.2/css/bootstrap.min.css">
    <style>
        body {{ font: 14px sans-serif; }}
        .wrapper {{ width: 360px; padding: 20px; margin: 50px auto; }}
    </style>
</head>
<body>
    <div class="wrapper">
{body}
    </div>
</body>
</html>"#,
        title = html_escape::encode_text(title),
    )
}

fn alert_block(alert: Option<&str>) -> String {
    alert.map_or_else(String::new, |msg| {
        format!(
            "        <div class=\"alert alert-danger\">{}</div>\n",
            html_escape::encode_text(msg)
        )
    })
}

fn form_field(label: &str, name: &str, kind: &str, value: &str, error: Option<&str>) -> String {
    let invalid = if error.is_some() { " is-invalid" } else { "" };

    // Password fields are rendered without a value attribute.
    let value_attr = if kind == "password" || value.is_empty() {
        String::new()
    } else {
        format!(
            " value=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        )
    };

    let mut field = String::new();
    let _ = write!(
        field,
        r#"        <div class="form-group">
            <label for="{name}">{label}</label>
            <input type="{kind}" name="{name}" id="{name}" class="form-control{invalid}"{value_attr}>
"#
    );
    if let Some(msg) = error {
        let _ = writeln!(
            field,
            "            <span class=\"invalid-feedback\">{}</span>",
            html_escape::encode_text(msg)
        );
    }
    field.push_str("        </div>\n");
    field
}

pub fn login_page(username: &str, errors: &FieldErrors, alert: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("        <h2>Login</h2>\n");
    body.push_str("        <p>Please fill in your credentials to login.</p>\n");
    body.push_str(&alert_block(alert));
    body.push_str("        <form action=\"/login\" method=\"post\" novalidate>\n");
    body.push_str(&form_field(
        "Username",
        "username",
        "text",
        username,
        errors.username.as_deref(),
    ));
    body.push_str(&form_field(
        "Password",
        "password",
        "password",
        "",
        errors.password.as_deref(),
    ));
    body.push_str(
        "        <div class=\"form-group\">\n            <input type=\"submit\" class=\"btn btn-primary\" value=\"Login\">\n        </div>\n",
    );
    body.push_str(
        "        <p>Don't have an account? <a href=\"/register\">Sign up now</a>.</p>\n        </form>",
    );

    layout("Login", &body)
}

pub fn register_page(username: &str, errors: &FieldErrors, alert: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("        <h2>Sign Up</h2>\n");
    body.push_str("        <p>Please fill this form to create an account.</p>\n");
    body.push_str(&alert_block(alert));
    body.push_str("        <form action=\"/register\" method=\"post\" novalidate>\n");
    body.push_str(&form_field(
        "Username",
        "username",
        "text",
        username,
        errors.username.as_deref(),
    ));
    body.push_str(&form_field(
        "Password",
        "password",
        "password",
        "",
        errors.password.as_deref(),
    ));
    body.push_str(&form_field(
        "Confirm Password",
        "confirm_password",
        "password",
        "",
        errors.confirm_password.as_deref(),
    ));
    body.push_str(
        "        <div class=\"form-group\">\n            <input type=\"submit\" class=\"btn btn-primary\" value=\"Submit\">\n        </div>\n",
    );
    let _ = write!(
        body,
        "        <p>Already have an account? <a href=\"{LOGIN_PAGE}\">Login here</a>.</p>\n        </form>"
    );

    layout("Sign Up", &body)
}

pub fn reset_password_page(errors: &FieldErrors, alert: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("        <h2>Reset Password</h2>\n");
    body.push_str("        <p>Please fill out this form to reset your password.</p>\n");
    body.push_str(&alert_block(alert));
    body.push_str("        <form action=\"/reset-password\" method=\"post\" novalidate>\n");
    body.push_str(&form_field(
        "New Password",
        "new_password",
        "password",
        "",
        errors.password.as_deref(),
    ));
    body.push_str(&form_field(
        "Confirm Password",
        "confirm_password",
        "password",
        "",
        errors.confirm_password.as_deref(),
    ));
    let _ = write!(
        body,
        "        <div class=\"form-group\">\n            <input type=\"submit\" class=\"btn btn-primary\" value=\"Submit\">\n            <a class=\"btn btn-link ml-2\" href=\"{WELCOME_PAGE}\">Cancel</a>\n        </div>\n        </form>"
    );

    layout("Reset Password", &body)
}

pub fn welcome_page(username: &str) -> String {
    let username = html_escape::encode_text(username);

    let body = format!(
        r#"        <h1 class="my-5">Hi, <b>{username}</b>. Welcome to our site.</h1>
        <p>
            <a href="/reset-password" class="btn btn-warning">Reset Your Password</a>
            <a href="/logout" class="btn btn-danger ml-3">Sign Out of Your Account</a>
        </p>"#
    );

    layout("Welcome", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "        <h2>Something went wrong</h2>\n        <div class=\"alert alert-danger\">{}</div>\n        <p><a href=\"{LOGIN_PAGE}\">Back to login</a></p>",
        html_escape::encode_text(message)
    );

    layout("Error", &body)
}
