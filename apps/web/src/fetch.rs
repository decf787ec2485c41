use dashboard_core::loader::{DEFAULT_EDUCATION, DEFAULT_SALES_DATA, DEFAULT_TOPOLOGY};
use dashboard_core::{LoadError, Sources, Variant};
use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, UrlSearchParams};

fn js_error(location: &str, error: &JsValue) -> LoadError {
    LoadError::fetch(
        location,
        error.as_string().unwrap_or_else(|| format!("{error:?}")),
    )
}

/// Fetches `location` with the browser fetch API and returns the raw body.
pub async fn fetch_bytes(location: String) -> Result<Vec<u8>, LoadError> {
    let Some(window) = web_sys::window() else {
        return Err(LoadError::fetch(location, "no window"));
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&location, &opts)
        .map_err(|error| js_error(&location, &error))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|error| js_error(&location, &error))?;
    let response: Response = response
        .dyn_into()
        .map_err(|error| js_error(&location, &error))?;
    if !response.ok() {
        return Err(LoadError::fetch(
            location,
            format!("HTTP {}", response.status()),
        ));
    }

    let body = response
        .array_buffer()
        .map_err(|error| js_error(&location, &error))?;
    let buffer = JsFuture::from(body)
        .await
        .map_err(|error| js_error(&location, &error))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Resource locations from the page query string, e.g.
/// `?variant=education&topology=counties.json`.
pub fn page_sources() -> Sources {
    let params = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .and_then(|search| UrlSearchParams::new_with_str(&search).ok());
    sources_from(|key| params.as_ref()?.get(key))
}

fn sources_from(lookup: impl Fn(&str) -> Option<String>) -> Sources {
    let variant = lookup("variant")
        .and_then(|name| Variant::parse(&name))
        .unwrap_or(Variant::Sales);
    let location = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
    match variant {
        Variant::Sales => Sources::Sales {
            data: location("data", DEFAULT_SALES_DATA),
        },
        Variant::Education => Sources::Education {
            topology: location("topology", DEFAULT_TOPOLOGY),
            education: location("education", DEFAULT_EDUCATION),
        },
    }
}
