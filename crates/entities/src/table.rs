//! Named character reference table.
//!
//! The HTML 4 named set plus the markup-significant HTML5 additions.
//! Entries are bucketed by the first letter of the reference name and
//! ordered longest-first inside each bucket so that a forward scan
//! yields the longest match, the way a trie walk would.

pub(crate) struct Entity {
    /// Reference name without the leading `&` or trailing `;`.
    pub name: &'static str,
    /// Replacement text.
    pub text: &'static str,
}

macro_rules! entities {
    ( $( $name:literal => $text:literal ),* $(,)? ) => {
        &[ $( Entity { name: $name, text: $text } ),* ]
    };
}

pub(crate) fn bucket(first: u8) -> &'static [Entity] {
    match first {
        b'A' => entities![
            "Agrave" => "\u{c0}", "Aacute" => "\u{c1}", "Atilde" => "\u{c3}",
            "AElig" => "\u{c6}", "Acirc" => "\u{c2}", "Aring" => "\u{c5}",
            "Alpha" => "\u{391}", "Auml" => "\u{c4}",
        ],
        b'B' => entities!["Beta" => "\u{392}"],
        b'C' => entities!["Ccedil" => "\u{c7}", "Chi" => "\u{3a7}"],
        b'D' => entities!["Dagger" => "\u{2021}", "Delta" => "\u{394}"],
        b'E' => entities![
            "Epsilon" => "\u{395}", "Egrave" => "\u{c8}", "Eacute" => "\u{c9}",
            "Ecirc" => "\u{ca}", "Euml" => "\u{cb}", "ETH" => "\u{d0}",
            "Eta" => "\u{397}",
        ],
        b'G' => entities!["Gamma" => "\u{393}"],
        b'I' => entities![
            "Igrave" => "\u{cc}", "Iacute" => "\u{cd}", "Icirc" => "\u{ce}",
            "Iuml" => "\u{cf}", "Iota" => "\u{399}",
        ],
        b'K' => entities!["Kappa" => "\u{39a}"],
        b'L' => entities!["Lambda" => "\u{39b}"],
        b'M' => entities!["Mu" => "\u{39c}"],
        b'N' => entities!["Ntilde" => "\u{d1}", "Nu" => "\u{39d}"],
        b'O' => entities![
            "Omicron" => "\u{39f}", "Ograve" => "\u{d2}", "Oacute" => "\u{d3}",
            "Otilde" => "\u{d5}", "Oslash" => "\u{d8}", "OElig" => "\u{152}",
            "Ocirc" => "\u{d4}", "Omega" => "\u{3a9}", "Ouml" => "\u{d6}",
        ],
        b'P' => entities!["Prime" => "\u{2033}", "Phi" => "\u{3a6}", "Psi" => "\u{3a8}", "Pi" => "\u{3a0}"],
        b'R' => entities!["Rho" => "\u{3a1}"],
        b'S' => entities!["Scaron" => "\u{160}", "Sigma" => "\u{3a3}"],
        b'T' => entities!["THORN" => "\u{de}", "Theta" => "\u{398}", "Tau" => "\u{3a4}"],
        b'U' => entities![
            "Upsilon" => "\u{3a5}", "Ugrave" => "\u{d9}", "Uacute" => "\u{da}",
            "Ucirc" => "\u{db}", "Uuml" => "\u{dc}",
        ],
        b'X' => entities!["Xi" => "\u{39e}"],
        b'Y' => entities!["Yacute" => "\u{dd}", "Yuml" => "\u{178}"],
        b'Z' => entities!["Zeta" => "\u{396}"],
        b'a' => entities![
            "alefsym" => "\u{2135}", "agrave" => "\u{e0}", "aacute" => "\u{e1}",
            "atilde" => "\u{e3}", "acirc" => "\u{e2}", "acute" => "\u{b4}",
            "aelig" => "\u{e6}", "aring" => "\u{e5}", "alpha" => "\u{3b1}",
            "asymp" => "\u{2248}", "apos" => "'", "auml" => "\u{e4}",
            "amp" => "&", "and" => "\u{2227}", "ang" => "\u{2220}",
        ],
        b'b' => entities![
            "brvbar" => "\u{a6}", "bdquo" => "\u{201e}", "beta" => "\u{3b2}",
            "bull" => "\u{2022}",
        ],
        b'c' => entities![
            "curren" => "\u{a4}", "ccedil" => "\u{e7}", "clubs" => "\u{2663}",
            "crarr" => "\u{21b5}", "cedil" => "\u{b8}", "cent" => "\u{a2}",
            "circ" => "\u{2c6}", "cong" => "\u{2245}", "copy" => "\u{a9}",
            "chi" => "\u{3c7}", "cap" => "\u{2229}", "cup" => "\u{222a}",
        ],
        b'd' => entities![
            "dagger" => "\u{2020}", "divide" => "\u{f7}", "delta" => "\u{3b4}",
            "diams" => "\u{2666}", "dArr" => "\u{21d3}", "darr" => "\u{2193}",
            "deg" => "\u{b0}",
        ],
        b'e' => entities![
            "epsilon" => "\u{3b5}", "egrave" => "\u{e8}", "eacute" => "\u{e9}",
            "empty" => "\u{2205}", "equiv" => "\u{2261}", "exist" => "\u{2203}",
            "ecirc" => "\u{ea}", "emsp" => "\u{2003}", "ensp" => "\u{2002}",
            "euml" => "\u{eb}", "euro" => "\u{20ac}", "eta" => "\u{3b7}",
            "eth" => "\u{f0}",
        ],
        b'f' => entities![
            "forall" => "\u{2200}", "frac12" => "\u{bd}", "frac14" => "\u{bc}",
            "frac34" => "\u{be}", "frasl" => "\u{2044}", "fnof" => "\u{192}",
        ],
        b'g' => entities!["gamma" => "\u{3b3}", "ge" => "\u{2265}", "gt" => ">"],
        b'h' => entities![
            "hearts" => "\u{2665}", "hellip" => "\u{2026}", "hArr" => "\u{21d4}",
            "harr" => "\u{2194}",
        ],
        b'i' => entities![
            "iquest" => "\u{bf}", "igrave" => "\u{ec}", "iacute" => "\u{ed}",
            "icirc" => "\u{ee}", "iexcl" => "\u{a1}", "image" => "\u{2111}",
            "infin" => "\u{221e}", "isin" => "\u{2208}", "iuml" => "\u{ef}",
            "iota" => "\u{3b9}", "int" => "\u{222b}",
        ],
        b'k' => entities!["kappa" => "\u{3ba}"],
        b'l' => entities![
            "lambda" => "\u{3bb}", "lfloor" => "\u{230a}", "lowast" => "\u{2217}",
            "lsaquo" => "\u{2039}", "lceil" => "\u{2308}", "ldquo" => "\u{201c}",
            "lsquo" => "\u{2018}", "laquo" => "\u{ab}", "lang" => "\u{27e8}",
            "lArr" => "\u{21d0}", "larr" => "\u{2190}", "loz" => "\u{25ca}",
            "lrm" => "\u{200e}", "le" => "\u{2264}", "lt" => "<",
        ],
        b'm' => entities![
            "middot" => "\u{b7}", "minus" => "\u{2212}", "mdash" => "\u{2014}",
            "micro" => "\u{b5}", "macr" => "\u{af}", "mu" => "\u{3bc}",
        ],
        b'n' => entities![
            "ntilde" => "\u{f1}", "notin" => "\u{2209}", "nabla" => "\u{2207}",
            "ndash" => "\u{2013}", "nbsp" => "\u{a0}", "nsub" => "\u{2284}",
            "not" => "\u{ac}", "ne" => "\u{2260}", "ni" => "\u{220b}",
            "nu" => "\u{3bd}",
        ],
        b'o' => entities![
            "omicron" => "\u{3bf}", "ograve" => "\u{f2}", "oacute" => "\u{f3}",
            "otilde" => "\u{f5}", "otimes" => "\u{2297}", "oslash" => "\u{f8}",
            "oplus" => "\u{2295}", "oline" => "\u{203e}", "omega" => "\u{3c9}",
            "oelig" => "\u{153}", "ocirc" => "\u{f4}", "ordf" => "\u{aa}",
            "ordm" => "\u{ba}", "ouml" => "\u{f6}", "or" => "\u{2228}",
        ],
        b'p' => entities![
            "plusmn" => "\u{b1}", "permil" => "\u{2030}", "prime" => "\u{2032}",
            "pound" => "\u{a3}", "para" => "\u{b6}", "part" => "\u{2202}",
            "perp" => "\u{22a5}", "prod" => "\u{220f}", "prop" => "\u{221d}",
            "phi" => "\u{3c6}", "piv" => "\u{3d6}", "psi" => "\u{3c8}",
            "pi" => "\u{3c0}",
        ],
        b'q' => entities!["quot" => "\""],
        b'r' => entities![
            "rfloor" => "\u{230b}", "rsaquo" => "\u{203a}", "radic" => "\u{221a}",
            "rceil" => "\u{2309}", "rdquo" => "\u{201d}", "rsquo" => "\u{2019}",
            "raquo" => "\u{bb}", "rang" => "\u{27e9}", "rArr" => "\u{21d2}",
            "rarr" => "\u{2192}", "real" => "\u{211c}", "reg" => "\u{ae}",
            "rho" => "\u{3c1}", "rlm" => "\u{200f}",
        ],
        b's' => entities![
            "sigmaf" => "\u{3c2}", "scaron" => "\u{161}", "spades" => "\u{2660}",
            "sbquo" => "\u{201a}", "sigma" => "\u{3c3}", "szlig" => "\u{df}",
            "sect" => "\u{a7}", "sdot" => "\u{22c5}", "sube" => "\u{2286}",
            "supe" => "\u{2287}", "sup1" => "\u{b9}", "sup2" => "\u{b2}",
            "sup3" => "\u{b3}", "shy" => "\u{ad}", "sim" => "\u{223c}",
            "sub" => "\u{2282}", "sum" => "\u{2211}", "sup" => "\u{2283}",
        ],
        b't' => entities![
            "thetasym" => "\u{3d1}", "there4" => "\u{2234}", "thinsp" => "\u{2009}",
            "theta" => "\u{3b8}", "thorn" => "\u{fe}", "tilde" => "\u{2dc}",
            "times" => "\u{d7}", "trade" => "\u{2122}", "tau" => "\u{3c4}",
        ],
        b'u' => entities![
            "upsilon" => "\u{3c5}", "ugrave" => "\u{f9}", "uacute" => "\u{fa}",
            "ucirc" => "\u{fb}", "upsih" => "\u{3d2}", "uArr" => "\u{21d1}",
            "uarr" => "\u{2191}", "uuml" => "\u{fc}", "uml" => "\u{a8}",
        ],
        b'w' => entities!["weierp" => "\u{2118}"],
        b'x' => entities!["xi" => "\u{3be}"],
        b'y' => entities!["yacute" => "\u{fd}", "yuml" => "\u{ff}", "yen" => "\u{a5}"],
        b'z' => entities!["zeta" => "\u{3b6}", "zwnj" => "\u{200c}", "zwj" => "\u{200d}"],
        _ => &[],
    }
}
