/// Placeholder in a version template for the captured version token.
const VERSION_PLACEHOLDER: &str = "[VER]";

/// What the placeholder expands to: a permissive version-like token, ASCII
/// only.
const VERSION_CAPTURE: &str = r"([0-9A-Za-z_.+]+)";

/// A named slot for version extraction.
///
/// The variant's position in [`Property::ALL`] is its integer key. Each
/// property owns an ordered list of templates; the first template that
/// matches the User-Agent supplies the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    // Build
    Mobile,
    Build,
    Version,
    VendorId,
    // Devices
    IPad,
    IPhone,
    IPod,
    Kindle,
    // Browsers
    Chrome,
    Coast,
    Dolfin,
    Firefox,
    Fennec,
    Ie,
    NetFront,
    NokiaBrowser,
    Opera,
    OperaMini,
    OperaMobi,
    UcBrowser,
    MqqBrowser,
    MicroMessenger,
    BaiduBoxApp,
    BaiduBrowser,
    Safari,
    Skyfire,
    Tizen,
    Webkit,
    // Engines
    Gecko,
    Trident,
    Presto,
    // Operating systems
    Ios,
    Android,
    BlackBerry,
    Brew,
    Java,
    WindowsPhoneOs,
    WindowsPhone,
    WindowsCe,
    WindowsNt,
    Symbian,
    WebOs,
}

impl Property {
    pub const ALL: [Property; 42] = [
        Self::Mobile,
        Self::Build,
        Self::Version,
        Self::VendorId,
        Self::IPad,
        Self::IPhone,
        Self::IPod,
        Self::Kindle,
        Self::Chrome,
        Self::Coast,
        Self::Dolfin,
        Self::Firefox,
        Self::Fennec,
        Self::Ie,
        Self::NetFront,
        Self::NokiaBrowser,
        Self::Opera,
        Self::OperaMini,
        Self::OperaMobi,
        Self::UcBrowser,
        Self::MqqBrowser,
        Self::MicroMessenger,
        Self::BaiduBoxApp,
        Self::BaiduBrowser,
        Self::Safari,
        Self::Skyfire,
        Self::Tizen,
        Self::Webkit,
        Self::Gecko,
        Self::Trident,
        Self::Presto,
        Self::Ios,
        Self::Android,
        Self::BlackBerry,
        Self::Brew,
        Self::Java,
        Self::WindowsPhoneOs,
        Self::WindowsPhone,
        Self::WindowsCe,
        Self::WindowsNt,
        Self::Symbian,
        Self::WebOs,
    ];

    /// Resolve a property name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mobile" => Some(Self::Mobile),
            "build" => Some(Self::Build),
            "version" => Some(Self::Version),
            "vendorid" => Some(Self::VendorId),
            "ipad" => Some(Self::IPad),
            "iphone" => Some(Self::IPhone),
            "ipod" => Some(Self::IPod),
            "kindle" => Some(Self::Kindle),
            "chrome" => Some(Self::Chrome),
            "coast" => Some(Self::Coast),
            "dolfin" => Some(Self::Dolfin),
            "firefox" => Some(Self::Firefox),
            "fennec" => Some(Self::Fennec),
            "ie" => Some(Self::Ie),
            "netfront" => Some(Self::NetFront),
            "nokiabrowser" => Some(Self::NokiaBrowser),
            "opera" => Some(Self::Opera),
            "opera mini" => Some(Self::OperaMini),
            "opera mobi" => Some(Self::OperaMobi),
            "uc browser" => Some(Self::UcBrowser),
            "mqqbrowser" => Some(Self::MqqBrowser),
            "micromessenger" => Some(Self::MicroMessenger),
            "baiduboxapp" => Some(Self::BaiduBoxApp),
            "baidubrowser" => Some(Self::BaiduBrowser),
            "safari" => Some(Self::Safari),
            "skyfire" => Some(Self::Skyfire),
            "tizen" => Some(Self::Tizen),
            "webkit" => Some(Self::Webkit),
            "gecko" => Some(Self::Gecko),
            "trident" => Some(Self::Trident),
            "presto" => Some(Self::Presto),
            "ios" => Some(Self::Ios),
            "android" => Some(Self::Android),
            "blackberry" => Some(Self::BlackBerry),
            "brew" => Some(Self::Brew),
            "java" => Some(Self::Java),
            "windows phone os" => Some(Self::WindowsPhoneOs),
            "windows phone" => Some(Self::WindowsPhone),
            "windows ce" => Some(Self::WindowsCe),
            "windows nt" => Some(Self::WindowsNt),
            "symbian" => Some(Self::Symbian),
            "webos" => Some(Self::WebOs),
            _ => None,
        }
    }

    pub fn from_key(key: u16) -> Option<Self> {
        Self::ALL.get(key as usize).copied()
    }

    pub fn key(&self) -> u16 {
        *self as u16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Build => "Build",
            Self::Version => "Version",
            Self::VendorId => "VendorID",
            Self::IPad => "iPad",
            Self::IPhone => "iPhone",
            Self::IPod => "iPod",
            Self::Kindle => "Kindle",
            Self::Chrome => "Chrome",
            Self::Coast => "Coast",
            Self::Dolfin => "Dolfin",
            Self::Firefox => "Firefox",
            Self::Fennec => "Fennec",
            Self::Ie => "IE",
            Self::NetFront => "NetFront",
            Self::NokiaBrowser => "NokiaBrowser",
            Self::Opera => "Opera",
            Self::OperaMini => "Opera Mini",
            Self::OperaMobi => "Opera Mobi",
            Self::UcBrowser => "UC Browser",
            Self::MqqBrowser => "MQQBrowser",
            Self::MicroMessenger => "MicroMessenger",
            Self::BaiduBoxApp => "baiduboxapp",
            Self::BaiduBrowser => "baidubrowser",
            Self::Safari => "Safari",
            Self::Skyfire => "Skyfire",
            Self::Tizen => "Tizen",
            Self::Webkit => "Webkit",
            Self::Gecko => "Gecko",
            Self::Trident => "Trident",
            Self::Presto => "Presto",
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::BlackBerry => "BlackBerry",
            Self::Brew => "BREW",
            Self::Java => "Java",
            Self::WindowsPhoneOs => "Windows Phone OS",
            Self::WindowsPhone => "Windows Phone",
            Self::WindowsCe => "Windows CE",
            Self::WindowsNt => "Windows NT",
            Self::Symbian => "Symbian",
            Self::WebOs => "webOS",
        }
    }

    /// Version templates in the order they are tried.
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::Mobile => &["Mobile/[VER]"],
            Self::Build => &["Build/[VER]"],
            Self::Version => &["Version/[VER]"],
            Self::VendorId => &["VendorID/[VER]"],
            Self::IPad => &["iPad.*CPU[a-z ]+[VER]"],
            Self::IPhone => &["iPhone.*CPU[a-z ]+[VER]"],
            Self::IPod => &["iPod.*CPU[a-z ]+[VER]"],
            Self::Kindle => &["Kindle/[VER]"],
            Self::Chrome => &["Chrome/[VER]", "CriOS/[VER]", "CrMo/[VER]"],
            Self::Coast => &["Coast/[VER]"],
            Self::Dolfin => &["Dolfin/[VER]"],
            Self::Firefox => &["Firefox/[VER]"],
            Self::Fennec => &["Fennec/[VER]"],
            Self::Ie => &["IEMobile/[VER];", "IEMobile [VER]", "MSIE [VER];"],
            Self::NetFront => &["NetFront/[VER]"],
            Self::NokiaBrowser => &["NokiaBrowser/[VER]"],
            Self::Opera => &[" OPR/[VER]", "Opera Mini/[VER]", "Version/[VER]"],
            Self::OperaMini => &["Opera Mini/[VER]"],
            Self::OperaMobi => &["Version/[VER]"],
            Self::UcBrowser => &["UC Browser[VER]"],
            Self::MqqBrowser => &["MQQBrowser/[VER]"],
            Self::MicroMessenger => &["MicroMessenger/[VER]"],
            Self::BaiduBoxApp => &["baiduboxapp/[VER]"],
            Self::BaiduBrowser => &["baidubrowser/[VER]"],
            Self::Safari => &["Version/[VER]", "Safari/[VER]"],
            Self::Skyfire => &["Skyfire/[VER]"],
            Self::Tizen => &["Tizen/[VER]"],
            Self::Webkit => &["webkit[ /][VER]"],
            Self::Gecko => &["Gecko/[VER]"],
            Self::Trident => &["Trident/[VER]"],
            Self::Presto => &["Presto/[VER]"],
            Self::Ios => &[r" \bOS\b [VER] "],
            Self::Android => &["Android [VER]"],
            Self::BlackBerry => &[r"BlackBerry[\w]+/[VER]", "BlackBerry.*Version/[VER]", "Version/[VER]"],
            Self::Brew => &["BREW [VER]"],
            Self::Java => &["Java/[VER]"],
            Self::WindowsPhoneOs => &["Windows Phone OS [VER]", "Windows Phone [VER]"],
            Self::WindowsPhone => &["Windows Phone [VER]"],
            Self::WindowsCe => &["Windows CE/[VER]"],
            Self::WindowsNt => &["Windows NT [VER]"],
            Self::Symbian => &["SymbianOS/[VER]", "Symbian/[VER]"],
            Self::WebOs => &["webOS/[VER]", "hpwOS/[VER];"],
        }
    }

    /// Templates with the placeholder expanded into a capture group.
    pub(crate) fn patterns(&self) -> impl Iterator<Item = String> {
        self.templates()
            .iter()
            .map(|template| template.replace(VERSION_PLACEHOLDER, VERSION_CAPTURE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_declaration_order() {
        for (idx, property) in Property::ALL.iter().enumerate() {
            assert_eq!(property.key() as usize, idx);
            assert_eq!(Property::from_key(idx as u16), Some(*property));
        }
        assert_eq!(Property::from_key(Property::ALL.len() as u16), None);
        assert_eq!(Property::Mobile.key(), 0);
        assert_eq!(Property::Android.key(), 32);
    }

    #[test]
    fn names_round_trip_case_insensitively() {
        for property in Property::ALL {
            assert_eq!(Property::from_name(property.as_str()), Some(property));
            assert_eq!(Property::from_name(&property.as_str().to_uppercase()), Some(property));
        }
        assert_eq!(Property::from_name("windows phone os"), Some(Property::WindowsPhoneOs));
        assert_eq!(Property::from_name("Unknown property"), None);
        assert_eq!(Property::from_name("MSIE"), None);
    }

    #[test]
    fn every_property_has_a_placeholder_template() {
        for property in Property::ALL {
            assert!(!property.templates().is_empty());
            assert!(property.templates().iter().all(|t| t.contains(VERSION_PLACEHOLDER)));
        }
    }

    #[test]
    fn placeholder_expands_to_capture() {
        let patterns: Vec<String> = Property::Chrome.patterns().collect();
        assert_eq!(
            patterns,
            [r"Chrome/([0-9A-Za-z_.+]+)", r"CriOS/([0-9A-Za-z_.+]+)", r"CrMo/([0-9A-Za-z_.+]+)"]
        );
    }
}
