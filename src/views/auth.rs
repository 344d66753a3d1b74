//! Login and signup forms

use crate::actions::{FormKind, Intent};
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, View};

fn brand() -> Markup {
    Markup::trusted(
        "<div class=\"brand\"><i class=\"fa-solid fa-leaf\"></i><span>KhetGo</span></div>",
    )
}

pub fn render_login(_state: &AppState, _param: Option<&str>) -> Markup {
    markup!(
        "<div class=\"glass-card auth-card\">{}<h2>Welcome back</h2>\
         <form {}><input name=\"email\" type=\"email\" placeholder=\"Email\" required>\
         <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\
         <button type=\"submit\" class=\"btn-primary\">Sign in</button></form>\
         <p>New to KhetGo? <a {}>Create an account</a></p></div>",
        brand(),
        hook("login-form", EventKind::Submit, &Intent::Submit(FormKind::Login)),
        hook("goto-signup", EventKind::Click, &Intent::navigate(View::Signup))
    )
}

pub fn render_signup(_state: &AppState, _param: Option<&str>) -> Markup {
    markup!(
        "<div class=\"glass-card auth-card\">{}<h2>Join KhetGo</h2>\
         <form {}><input name=\"full_name\" type=\"text\" placeholder=\"Full name\" required>\
         <input name=\"email\" type=\"email\" placeholder=\"Email\" required>\
         <input name=\"phone\" type=\"tel\" placeholder=\"Mobile number\" required>\
         <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\
         <select name=\"role\"><option value=\"farmer\">Farmer</option><option value=\"buyer\">Buyer</option></select>\
         <input name=\"district\" type=\"text\" placeholder=\"District\">\
         <button type=\"submit\" class=\"btn-primary\">Create account</button></form>\
         <p>Already registered? <a {}>Sign in</a></p></div>",
        brand(),
        hook("signup-form", EventKind::Submit, &Intent::Submit(FormKind::Signup)),
        hook("goto-login", EventKind::Click, &Intent::navigate(View::Login))
    )
}
