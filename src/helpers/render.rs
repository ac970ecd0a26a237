use serde::Serialize;
use crate::models::restaurant::DisplayRestaurant;

pub const EMPTY_LIST_PLACEHOLDER: &str = "請輸入地址開始搜尋";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn glyph(self) -> char {
        match self {
            Star::Full => '★',
            Star::Half => '⯪',
            Star::Empty => '☆',
        }
    }

    fn icon_class(self) -> &'static str {
        match self {
            Star::Full => "fas fa-star",
            Star::Half => "fas fa-star-half-alt",
            Star::Empty => "far fa-star",
        }
    }
}

/// Slot `i` (1-based) is full when `i <= rating`, half when
/// `i - 0.5 <= rating < i`, empty otherwise.
pub fn star_rating(rating: f64) -> [Star; 5] {
    let mut stars = [Star::Empty; 5];
    for (slot, star) in stars.iter_mut().enumerate() {
        let i = (slot + 1) as f64;
        *star = if i <= rating {
            Star::Full
        } else if i - 0.5 <= rating {
            Star::Half
        } else {
            Star::Empty
        };
    }
    stars
}

pub fn star_text(rating: f64) -> String {
    star_rating(rating).iter().map(|s| s.glyph()).collect()
}

fn star_html(rating: f64) -> String {
    star_rating(rating)
        .iter()
        .map(|s| format!("<i class=\"{}\"></i>", s.icon_class()))
        .collect()
}

/// Localized label for a provider category. Accepts `meal_takeaway` and
/// `meal takeaway` alike; anything unknown is returned as is.
pub fn format_restaurant_type(category: &str) -> String {
    let label = match category.replace(' ', "_").as_str() {
        "restaurant" => "餐廳",
        "food" => "美食",
        "meal_takeaway" => "外帶餐廳",
        "bakery" => "烘焙店",
        "cafe" => "咖啡廳",
        "bar" => "酒吧",
        "night_club" => "夜店",
        "meal_delivery" => "外送餐廳",
        _ => return category.to_string(),
    };
    label.to_string()
}

pub fn price_level_label(price_level: Option<u8>) -> Option<&'static str> {
    match price_level? {
        0 => Some("免費"),
        1 => Some("$ 便宜"),
        2 => Some("$$ 適中"),
        3 => Some("$$$ 昂貴"),
        4 => Some("$$$$ 非常昂貴"),
        _ => None,
    }
}

pub fn rating_text(restaurant: &DisplayRestaurant) -> String {
    format!("{:.1} ({} 評論)", restaurant.rating, restaurant.rating_count)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Rebuilds the whole list from scratch. Entry order follows `restaurants`.
pub fn render_list(restaurants: &[DisplayRestaurant], selected: Option<&str>) -> String {
    if restaurants.is_empty() {
        return format!(
            "<div class=\"empty-state\"><i class=\"fas fa-search fa-2x mb-2\"></i><div>{}</div></div>",
            EMPTY_LIST_PLACEHOLDER
        );
    }

    restaurants
        .iter()
        .enumerate()
        .map(|(index, restaurant)| {
            render_item(restaurant, index, selected == Some(restaurant.id.as_str()))
        })
        .collect()
}

fn render_item(restaurant: &DisplayRestaurant, index: usize, selected: bool) -> String {
    let phone = match &restaurant.phone {
        Some(phone) => format!(
            "<div class=\"restaurant-phone\"><i class=\"fas fa-phone\"></i><a href=\"tel:{0}\">{0}</a></div>",
            escape_html(phone)
        ),
        None => String::new(),
    };
    let class = if selected { "restaurant-item selected" } else { "restaurant-item" };

    format!(
        "<div class=\"{class}\" data-index=\"{index}\" data-id=\"{id}\">\
<div class=\"restaurant-name\">{name}</div>\
<div class=\"restaurant-type\"><i class=\"fas fa-utensils\"></i>{category}</div>\
<div class=\"restaurant-address\"><i class=\"fas fa-map-marker-alt\"></i>{address}</div>\
<div class=\"restaurant-rating\"><span class=\"rating-stars\">{stars}</span><span class=\"rating-text\">{rating}</span></div>\
{phone}</div>",
        id = escape_html(&restaurant.id),
        name = escape_html(&restaurant.name),
        category = escape_html(&format_restaurant_type(&restaurant.category)),
        address = escape_html(&restaurant.address),
        stars = star_html(restaurant.rating),
        rating = rating_text(restaurant),
    )
}

/// Content of the single reusable map info popup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPopup {
    pub restaurant_id: String,
    pub name: String,
    pub category: String,
    pub stars: String,
    pub rating_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_label: Option<String>,
    pub address: String,
}

impl InfoPopup {
    pub fn for_restaurant(restaurant: &DisplayRestaurant) -> Self {
        Self {
            restaurant_id: restaurant.id.clone(),
            name: restaurant.name.clone(),
            category: restaurant.category.clone(),
            stars: star_text(restaurant.rating),
            rating_text: rating_text(restaurant),
            price_label: price_level_label(restaurant.price_level).map(str::to_string),
            address: restaurant.address.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        let price = match &self.price_label {
            Some(label) => format!("<div class=\"info-price\">{}</div>", escape_html(label)),
            None => String::new(),
        };
        format!(
            "<div class=\"info-popup\"><h6>{}</h6><div class=\"info-type\">{}</div>\
<div class=\"info-rating\"><span class=\"info-stars\">{}</span> {}</div>{}<div class=\"info-address\">{}</div></div>",
            escape_html(&self.name),
            escape_html(&self.category),
            self.stars,
            self.rating_text,
            price,
            escape_html(&self.address),
        )
    }
}
