use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use descgen_compiler::{Error, Result};
use descgen_core::SourceMap;

const STDIN: &str = "<stdin>";

/// Read every input in command-line order. `-` reads stdin (at most once).
pub fn load_sources(inputs: &[PathBuf]) -> Result<SourceMap> {
    let mut map = SourceMap::new();
    let mut stdin_used = false;
    for path in inputs {
        if path.as_os_str() == "-" {
            if stdin_used {
                return Err(Error::Io {
                    path: STDIN.to_string(),
                    message: "can only be read once".to_string(),
                });
            }
            stdin_used = true;
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| Error::io(STDIN, &e))?;
            map.add_stdin(&buf);
            continue;
        }
        let name = path.to_string_lossy();
        let content = fs::read_to_string(path).map_err(|e| Error::io(name.as_ref(), &e))?;
        map.add_file(&name, &content);
    }
    Ok(map)
}
