#![allow(dead_code)]

use netplace::{Netmap, Node};

/// Four-node development topology: two Russian locations, one Swedish, one
/// Finnish, all in Europe.
pub fn devenv_netmap() -> Netmap {
    let mut map = Netmap::new();
    for (id, country, locode, subdiv) in [
        ("s01", "Russia", "RU MOW", "MOW"),
        ("s02", "Russia", "RU LED", "SPE"),
        ("s03", "Sweden", "SE STO", "AB"),
        ("s04", "Finland", "FI HEL", "18"),
    ] {
        map.add_node(
            Node::new(id)
                .with_attr("Country", country)
                .with_attr("Continent", "Europe")
                .with_attr("UN-LOCODE", locode)
                .with_attr("SubDivCode", subdiv),
        );
    }
    map
}
