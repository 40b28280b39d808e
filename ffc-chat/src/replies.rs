//! Outbound reply templates. Tone matches the shop's existing chat voice:
//! short lines, one question per message.

use ffc_catalog::pricing::format_cents;
use ffc_catalog::{FulfillmentMode, PriceBreakdown};
use ffc_order::Order;
use ffc_shared::OrderId;

pub fn welcome() -> String {
    "Hi, this is FormFit Customs! Send a photo of the drawer you want \
     organized and we'll quote a custom-fit organizer."
        .to_string()
}

pub fn ask_for_details() -> String {
    "Got the photo! What material (PLA, PLA+ or PETG), color, and size \
     (small / medium / full drawer) would you like?"
        .to_string()
}

pub fn ask_resend_details() -> String {
    "Sorry, we didn't catch that. Could you resend the material, color and \
     size you want?"
        .to_string()
}

pub fn ask_fulfillment() -> String {
    "Noted! Should we print it in-house (SELF) or have our CLOUD partner \
     print and ship it? Reply SELF or CLOUD."
        .to_string()
}

pub fn proposal(order: &Order, price: &PriceBreakdown) -> String {
    let material = order.material.map(|m| m.as_str()).unwrap_or("PLA");
    let size = order.size.map(|s| s.as_str()).unwrap_or("medium");
    let color = order.color.as_deref().unwrap_or("black");
    let mode_line = match order.fulfillment {
        Some(FulfillmentMode::Cloud) => "Printed and shipped by our cloud partner",
        _ => "Printed in-house and mailed to you",
    };

    format!(
        "Here's your quote for a {size} organizer in {material} ({color}):\n\
         Base: {base}\n\
         Add-ons: {addons}\n\
         Shipping: {shipping}\n\
         Total: {total}\n\
         {mode_line}.\n\
         Reply YES to confirm or NO to cancel.",
        size = size,
        material = material,
        color = color,
        base = format_cents(price.base_cents),
        addons = format_cents(price.addons_cents),
        shipping = format_cents(price.shipping_cents),
        total = format_cents(price.total_cents),
        mode_line = mode_line,
    )
}

pub fn confirmation(order_id: &OrderId) -> String {
    format!(
        "You're all set! Your order number is {}. We'll message you when it \
         ships.",
        order_id
    )
}

pub fn cancelled() -> String {
    "No problem, we've cancelled that quote. Send another photo any time \
     you'd like to start over."
        .to_string()
}

pub fn reprompt_yes_no() -> String {
    "Just to be sure: reply YES to confirm the quote or NO to cancel."
        .to_string()
}

pub fn welcome_back() -> String {
    "Welcome back! Send a photo of the next drawer and we'll get you a \
     fresh quote."
        .to_string()
}
