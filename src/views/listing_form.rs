use crate::actions::{FormKind, Intent};
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::AppState;

const CATEGORIES: [&str; 5] = ["Vegetables", "Fruits", "Grains", "Pulses", "Spices"];

pub fn render(_state: &AppState, _param: Option<&str>) -> Markup {
    let options: Markup = CATEGORIES
        .iter()
        .map(|c| markup!("<option value=\"{}\">{}</option>", c, c))
        .collect();

    markup!(
        "<form class=\"glass-card form-card\" {}>\
         <label>Crop name</label><input name=\"name\" type=\"text\" required>\
         <label>Category</label><select name=\"category\">{}</select>\
         <label>Price (per unit)</label><input name=\"price\" type=\"number\" step=\"0.01\" required>\
         <label>Unit</label><input name=\"unit\" type=\"text\" value=\"kg\">\
         <label>Quantity</label><input name=\"quantity\" type=\"text\" placeholder=\"e.g. 500 kg\" required>\
         <label>Location</label><input name=\"location\" type=\"text\" required>\
         <label>Pincode</label><input name=\"pincode\" type=\"text\" maxlength=\"6\" required>\
         <label>Description</label><textarea name=\"description\"></textarea>\
         <label>Photo</label><input name=\"image\" type=\"file\" accept=\"image/jpeg,image/png,image/webp\">\
         <button type=\"submit\" class=\"btn-primary\">Publish listing</button></form>",
        hook("add-listing-form", EventKind::Submit, &Intent::Submit(FormKind::AddListing)),
        options
    )
}
