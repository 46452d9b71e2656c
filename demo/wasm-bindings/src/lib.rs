//! WASM bindings for the screen engagement demo page
//!
//! Exposes `EngagementTracker` to the page that renders the simulated phone.
//! The page owns the `IntersectionObserver` and scroll listeners and forwards
//! their measurements here; summaries come back as JSON strings.

use std::panic;

use screen_engagement::{
    Clock, ElementObserver, ListPosition, PageGeometry, Rect, ScreenTracker, Timestamp, Tracked,
    TrackerConfig,
};
use serde::Serialize;
use tracing::error;
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};

#[wasm_bindgen(start)]
pub fn start() {
    // Configure tracing
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );
    panic::set_hook(Box::new(console_error_panic_hook::hook));
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ============================================================================
// Host capabilities
// ============================================================================

/// `Date.now()` of the page
struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> Timestamp {
        js_sys::Date::now() as Timestamp
    }
}

/// Forwards observe/disconnect requests to page callbacks taking the element id
struct JsObserver {
    observe: js_sys::Function,
    disconnect: js_sys::Function,
}

impl JsObserver {
    fn call(callback: &js_sys::Function, element_id: &str) {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(element_id)) {
            error!("observer callback failed for {}: {:?}", element_id, e);
        }
    }
}

impl ElementObserver for JsObserver {
    fn observe(&mut self, element_id: &str) {
        Self::call(&self.observe, element_id);
    }

    fn disconnect(&mut self, element_id: &str) {
        Self::call(&self.disconnect, element_id);
    }
}

// ============================================================================
// Product catalogue
// ============================================================================

/// Product shown in the simulated phone list
#[derive(Tracked, Serialize, Debug, Clone)]
#[tracked(id_field = "index", id_prefix = "product_", description_field = "name")]
pub struct Product {
    pub index: usize,
    pub name: &'static str,
    pub description: &'static str,
}

const CATALOGUE: [(&str, &str); 20] = [
    ("Smart Home Security Camera System", "Keep your home safe with a high-definition camera system that provides real-time monitoring and alerts on your smartphone."),
    ("Wireless Noise-Canceling Earbuds", "Immerse yourself in crystal-clear sound with these sleek and wireless earbuds featuring advanced noise-canceling technology."),
    ("Foldable Electric Scooter", "Commute in style and eco-friendly with a foldable electric scooter that reaches speeds of up to 15 mph."),
    ("Digital Air Fryer", "Enjoy guilt-free crispy meals with this digital air fryer that uses hot air circulation to cook with little to no oil."),
    ("Fitness Tracker with Heart Rate Monitor", "Achieve your fitness goals with a smart tracker that monitors your heart rate, tracks steps, and provides insights into your workouts."),
    ("Portable Espresso Maker", "Brew a perfect cup of espresso on the go with this compact and portable espresso maker, compatible with coffee grounds or capsules."),
    ("Smart LED Plant Grow Light", "Help your indoor plants thrive with a smart LED grow light that mimics natural sunlight and can be controlled via a mobile app."),
    ("Waterproof Bluetooth Speaker", "Take your music anywhere with a waterproof Bluetooth speaker, perfect for pool parties, beach outings, or hiking trips."),
    ("Digital Drawing Tablet", "Unleash your creativity with a digital drawing tablet, equipped with pressure-sensitive pens for precise and intuitive drawing."),
    ("Aromatherapy Essential Oil Diffuser", "Create a relaxing atmosphere at home with an essential oil diffuser that combines aromatherapy with color-changing LED lights."),
    ("Collapsible Silicone Water Bottle", "Stay hydrated on the go with a collapsible silicone water bottle that folds down for easy storage when not in use."),
    ("Solar-Powered Phone Charger", "Charge your devices on the move with a solar-powered phone charger, harnessing the power of the sun for sustainable energy."),
    ("Virtual Reality Headset", "Immerse yourself in a virtual world with a VR headset, compatible with a wide range of games and experiences."),
    ("Stainless Steel Insulated Travel Mug", "Keep your beverages hot or cold for hours with a stainless steel insulated travel mug featuring a leak-proof design."),
    ("Foldable Laptop Stand", "Increase productivity and reduce neck strain with a foldable laptop stand that adjusts to different heights for ergonomic use."),
    ("Smart Thermostat", "Save energy and control your home's temperature remotely with a smart thermostat that learns your preferences over time."),
    ("Biodegradable Phone Case", "Protect your phone and the environment with a biodegradable phone case made from eco-friendly materials."),
    ("Wireless Charging Pad", "Charge your Qi-enabled devices wirelessly with a sleek and compact charging pad that blends seamlessly with any environment."),
    ("Portable UV-C Sanitizer Wand", "Ensure your surroundings are germ-free with a portable UV-C sanitizer wand that effectively eliminates bacteria and viruses."),
    ("Smart Luggage with GPS Tracker", "Travel with peace of mind using smart luggage equipped with a GPS tracker, USB charging ports, and built-in weighing scale."),
];

pub fn products() -> Vec<Product> {
    CATALOGUE
        .iter()
        .enumerate()
        .map(|(index, &(name, description))| Product { index, name, description })
        .collect()
}

/// Product list for rendering, as JSON
#[wasm_bindgen(js_name = productsJson)]
pub fn products_json() -> Result<String, JsValue> {
    serde_json::to_string(&products()).map_err(to_js)
}

// ============================================================================
// EngagementTracker
// ============================================================================

/// WASM wrapper for ScreenTracker
///
/// Dropping it (`.free()` on unmount) disconnects every observed element.
#[wasm_bindgen]
pub struct EngagementTracker {
    inner: ScreenTracker<JsObserver, JsClock>,
}

#[wasm_bindgen]
impl EngagementTracker {
    /// Create a tracker for a freshly loaded screen
    ///
    /// # Arguments
    /// * `config_json` - Optional partial `TrackerConfig` JSON
    /// * `observe` - Called with an element id when it should be observed
    /// * `disconnect` - Called with an element id when observation should stop
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        observe: js_sys::Function,
        disconnect: js_sys::Function,
    ) -> Result<EngagementTracker, JsValue> {
        let config = match config_json {
            Some(json) => TrackerConfig::from_json(&json).map_err(to_js)?,
            None => TrackerConfig::default(),
        };
        let inner = ScreenTracker::new(config, JsObserver { observe, disconnect }, JsClock).map_err(to_js)?;
        Ok(Self { inner })
    }

    /// Register every catalogue product; returns how many were newly observed
    #[wasm_bindgen(js_name = registerProducts)]
    pub fn register_products(&mut self) -> Result<u32, JsValue> {
        let products = products();
        let count = products.len() as u32;
        let mut registered = 0;
        for product in &products {
            let position = ListPosition::new(product.index as u32, count);
            if self.inner.register(product, position).map_err(to_js)? {
                registered += 1;
            }
        }
        Ok(registered)
    }

    #[wasm_bindgen(js_name = registerElement)]
    pub fn register_element(
        &mut self,
        id: String,
        description: String,
        index: u32,
        collection_size: u32,
    ) -> Result<bool, JsValue> {
        self.inner
            .register_element(&id, &description, ListPosition::new(index, collection_size))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = unregisterElement)]
    pub fn unregister_element(&mut self, id: String) -> Result<bool, JsValue> {
        self.inner.unregister(&id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = onIntersection)]
    pub fn on_intersection(&mut self, id: String, is_intersecting: bool) -> Result<(), JsValue> {
        self.inner.on_intersection(&id, is_intersecting).map_err(to_js)
    }

    /// Element and parent bounding rectangles from the intersection entry
    #[wasm_bindgen(js_name = onElementGeometry)]
    pub fn on_element_geometry(
        &mut self,
        id: String,
        element_top: f64,
        element_bottom: f64,
        container_top: f64,
        container_bottom: f64,
    ) -> Result<u8, JsValue> {
        let element = Rect::vertical(element_top, element_bottom);
        let container = Rect::vertical(container_top, container_bottom);
        self.inner
            .on_element_geometry(&id, &element, &container)
            .map_err(to_js)
    }

    /// Scroll view rectangle plus the tops of the content start/end markers
    #[wasm_bindgen(js_name = onPageScroll)]
    pub fn on_page_scroll(
        &mut self,
        viewport_top: f64,
        content_top: f64,
        content_bottom: f64,
        viewport_bottom: f64,
        viewport_left: f64,
        viewport_right: f64,
    ) -> Result<u32, JsValue> {
        let page = PageGeometry::new(
            viewport_top,
            content_top,
            content_bottom,
            viewport_bottom,
            viewport_left,
            viewport_right,
        );
        let offsets = self.inner.on_page_scroll(&page).map_err(to_js)?;
        Ok(offsets.y_offset)
    }

    /// Returns true when the app is now in background
    #[wasm_bindgen(js_name = toggleBackground)]
    pub fn toggle_background(&mut self) -> Result<bool, JsValue> {
        let state = self.inner.toggle_background().map_err(to_js)?;
        Ok(state == screen_engagement::AppState::Background)
    }

    /// Display cadence in milliseconds for `setInterval`
    #[wasm_bindgen(getter, js_name = refreshIntervalMs)]
    pub fn refresh_interval_ms(&self) -> u32 {
        self.inner.config().refresh_interval_ms.min(u64::from(u32::MAX)) as u32
    }

    /// Recompute and publish the summary; returns it as JSON
    pub fn refresh(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.inner.refresh()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = summaryJson)]
    pub fn summary_json(&self) -> Result<String, JsValue> {
        self.inner.summary_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = segmentsJson)]
    pub fn segments_json(&self) -> Result<String, JsValue> {
        self.inner.segments_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = warehouseJson)]
    pub fn warehouse_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.inner.warehouse()).map_err(to_js)
    }

    /// Leave the screen; returns the `screen_end` payload as JSON
    pub fn flush(&mut self) -> Result<String, JsValue> {
        let screen_end = self.inner.flush().map_err(to_js)?;
        serde_json::to_string_pretty(&screen_end).map_err(to_js)
    }
}
