//! Host platform integration: who is playing, and tactile feedback.

/// Identity reported by the host platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostIdentity {
    pub display_name: String,
    pub external_id: String,
}

pub trait HostBridge {
    /// `None` when the host knows nothing about the player.
    fn identity(&self) -> Option<HostIdentity>;
    /// One short vibration for a tap.
    fn haptic_pulse(&self);
}

/// No host at all (tests, native builds).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHost;

impl HostBridge for NoopHost {
    fn identity(&self) -> Option<HostIdentity> {
        None
    }

    fn haptic_pulse(&self) {}
}

/// Fixed identity and a pulse counter, for driving the engine in tests.
#[derive(Clone, Debug, Default)]
pub struct StaticHost {
    identity: Option<HostIdentity>,
    pulses: std::rc::Rc<std::cell::Cell<u32>>,
}

impl StaticHost {
    pub fn new(display_name: &str, external_id: &str) -> Self {
        Self {
            identity: Some(HostIdentity {
                display_name: display_name.to_string(),
                external_id: external_id.to_string(),
            }),
            pulses: Default::default(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Number of haptic pulses requested so far (shared between clones).
    pub fn pulses(&self) -> u32 {
        self.pulses.get()
    }
}

impl HostBridge for StaticHost {
    fn identity(&self) -> Option<HostIdentity> {
        self.identity.clone()
    }

    fn haptic_pulse(&self) {
        self.pulses.set(self.pulses.get() + 1);
    }
}

/// Telegram Mini App host (`window.Telegram.WebApp`).
///
/// WASM 環境でのみ動作。WebApp が無い場合（通常のブラウザで開いた場合）は
/// identity を返さず、振動は `navigator.vibrate` にフォールバックする。
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TelegramHost;

#[cfg(target_arch = "wasm32")]
mod telegram {
    use js_sys::{Function, JsString, Reflect};

    use super::{HostBridge, HostIdentity, TelegramHost};

    fn get(target: &js_sys::Object, key: &str) -> Option<js_sys::Object> {
        let value = Reflect::get(target, &JsString::from(key)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        Some(js_sys::Object::from(value))
    }

    fn web_app() -> Option<js_sys::Object> {
        let window = web_sys::window()?;
        let telegram = get(&window, "Telegram")?;
        get(&telegram, "WebApp")
    }

    fn string_field(target: &js_sys::Object, key: &str) -> Option<String> {
        let value = Reflect::get(target, &JsString::from(key)).ok()?;
        if let Some(s) = value.as_string() {
            return Some(s);
        }
        // Telegram user ids are numbers.
        value.as_f64().map(|n| format!("{}", n as i64))
    }

    impl HostBridge for TelegramHost {
        fn identity(&self) -> Option<HostIdentity> {
            let app = web_app()?;
            let init = get(&app, "initDataUnsafe")?;
            let user = get(&init, "user")?;
            let external_id = string_field(&user, "id").unwrap_or_default();
            let display_name = string_field(&user, "first_name")
                .or_else(|| string_field(&user, "username"))
                .unwrap_or_default();
            Some(HostIdentity {
                display_name,
                external_id,
            })
        }

        fn haptic_pulse(&self) {
            let impact = web_app()
                .and_then(|app| get(&app, "HapticFeedback"))
                .and_then(|haptic| {
                    let f = Reflect::get(&haptic, &JsString::from("impactOccurred")).ok()?;
                    if !f.is_function() {
                        return None;
                    }
                    Function::from(f)
                        .call1(&haptic, &JsString::from("light"))
                        .ok()
                });
            if impact.is_none() {
                if let Some(window) = web_sys::window() {
                    let _ = window.navigator().vibrate_with_duration(10);
                }
            }
        }
    }
}
