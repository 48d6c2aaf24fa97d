/// Define a PRAGMA value enum: each variant maps to the keyword SQLite
/// expects, and parses back from it case-insensitively.
macro_rules! enum_mode {
    (
        $(#[$meta:meta])* $vis:vis $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $keyword:literal, )+
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            /// Keyword used in the PRAGMA statement.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $keyword, )+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($keyword) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::Error::Protocol(format!(
                    concat!("unknown ", stringify!($name), ": {:?}"),
                    s
                )))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
