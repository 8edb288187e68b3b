use phf::{Set, phf_set};

/// Domains known to hand out throwaway mailboxes.
pub(crate) static BLOCKLIST: Set<&'static str> = phf_set! {
    "10minutemail.com",
    "10minutemail.net",
    "20minutemail.com",
    "33mail.com",
    "anonbox.net",
    "anonaddy.me",
    "burnermail.io",
    "discard.email",
    "dispostable.com",
    "emailondeck.com",
    "fakeinbox.com",
    "getairmail.com",
    "getnada.com",
    "grr.la",
    "guerrillamail.biz",
    "guerrillamail.com",
    "guerrillamail.de",
    "guerrillamail.net",
    "guerrillamail.org",
    "inboxkitten.com",
    "mailcatch.com",
    "maildrop.cc",
    "mailinator.com",
    "mailinator.net",
    "mailnesia.com",
    "mintemail.com",
    "moakt.com",
    "mohmal.com",
    "mytemp.email",
    "sharklasers.com",
    "spambox.us",
    "spamgourmet.com",
    "temp-mail.org",
    "tempmail.net",
    "tempr.email",
    "throwawaymail.com",
    "trashmail.com",
    "trashmail.de",
    "trbvm.com",
    "yopmail.com",
    "yopmail.fr",
    "yopmail.net",
};

/// Blocklisted domains that nonetheless host long-lived forwarding mailboxes.
pub(crate) static ALLOWLIST: Set<&'static str> = phf_set! {
    "33mail.com",
    "anonaddy.me",
    "spamgourmet.com",
};
