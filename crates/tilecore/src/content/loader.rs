use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::warn;

use crate::world::GridPoint;

use super::level::{EntityTag, LevelDescriptor, LevelId, MapLayout, MapLayoutError, SpawnRecord};

const DEFAULT_FILL_TILE: u16 = 1;

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("failed to read level directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read level file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML in {path} at line {line}, column {column}: {message}")]
    XmlMalformed {
        path: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },
    #[error("root element of {path} must be <Level>, found <{found}>")]
    InvalidRoot { path: PathBuf, found: String },
    #[error("<Level> in {path} is missing attribute '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        attribute: &'static str,
    },
    #[error("<Level> in {path} has invalid value '{value}' for '{attribute}'")]
    InvalidValue {
        path: PathBuf,
        attribute: &'static str,
        value: String,
    },
    #[error("invalid map in {path}: {source}")]
    InvalidMap {
        path: PathBuf,
        #[source]
        source: MapLayoutError,
    },
}

pub fn load_level_file(path: &Path) -> Result<LevelDescriptor, LevelLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelLoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level_document(path, &raw)
}

/// Parses a `<Level>` document. Whole-file problems are errors; a bad
/// `<Entity>` record is logged and skipped so the rest of the level loads.
pub fn parse_level_document(path: &Path, raw: &str) -> Result<LevelDescriptor, LevelLoadError> {
    let doc = Document::parse(raw).map_err(|error| LevelLoadError::XmlMalformed {
        path: path.to_path_buf(),
        line: error.pos().row,
        column: error.pos().col,
        message: error.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Level" {
        return Err(LevelLoadError::InvalidRoot {
            path: path.to_path_buf(),
            found: root.tag_name().name().to_string(),
        });
    }

    let name = root
        .attribute("name")
        .ok_or_else(|| LevelLoadError::MissingAttribute {
            path: path.to_path_buf(),
            attribute: "name",
        })?;
    let width = required_u32(path, root, "width")?;
    let height = required_u32(path, root, "height")?;
    let fill = match root.attribute("fill") {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|_| LevelLoadError::InvalidValue {
                path: path.to_path_buf(),
                attribute: "fill",
                value: value.to_string(),
            })?,
        None => DEFAULT_FILL_TILE,
    };

    let tiles_node = root
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == "Tiles");
    let map = match tiles_node {
        Some(node) => {
            let tiles = parse_tile_csv(path, node.text().unwrap_or_default())?;
            MapLayout::new(width, height, tiles)
        }
        None => MapLayout::filled(width, height, fill),
    }
    .map_err(|source| LevelLoadError::InvalidMap {
        path: path.to_path_buf(),
        source,
    })?;

    let mut level = LevelDescriptor::new(LevelId::new(name), map);
    for node in root.children().filter(|node| node.is_element()) {
        match node.tag_name().name() {
            "Tiles" => {}
            "Entity" => match parse_entity(node) {
                Ok((tag, record)) => level.push_record(tag, record),
                Err(reason) => {
                    let pos = doc.text_pos_at(node.range().start);
                    warn!(
                        file = %path.display(),
                        line = pos.row,
                        reason = reason.as_str(),
                        "spawn_record_skipped"
                    );
                }
            },
            other => {
                warn!(file = %path.display(), element = other, "unknown_level_element_ignored");
            }
        }
    }

    Ok(level)
}

fn required_u32(
    path: &Path,
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<u32, LevelLoadError> {
    let value = node
        .attribute(attribute)
        .ok_or_else(|| LevelLoadError::MissingAttribute {
            path: path.to_path_buf(),
            attribute,
        })?;
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelLoadError::InvalidValue {
            path: path.to_path_buf(),
            attribute,
            value: value.to_string(),
        })
}

fn parse_tile_csv(path: &Path, text: &str) -> Result<Vec<u16>, LevelLoadError> {
    text.split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u16>()
                .map_err(|_| LevelLoadError::InvalidValue {
                    path: path.to_path_buf(),
                    attribute: "Tiles",
                    value: token.to_string(),
                })
        })
        .collect()
}

fn parse_entity(node: Node<'_, '_>) -> Result<(EntityTag, SpawnRecord), String> {
    let type_token = node
        .attribute("type")
        .ok_or_else(|| "missing 'type' attribute".to_string())?;
    let tag = EntityTag::parse(type_token)
        .ok_or_else(|| format!("unknown entity type '{type_token}'"))?;
    let coords = GridPoint::new(entity_i32(node, "x")?, entity_i32(node, "y")?);

    let record = match tag {
        EntityTag::Player | EntityTag::Slime => SpawnRecord::Generic { coords },
        EntityTag::Decoration => SpawnRecord::Decoration {
            coords,
            sprite: node.attribute("sprite").unwrap_or("decoration").to_string(),
        },
        EntityTag::Interactable => SpawnRecord::Interactable {
            coords,
            sprite: node
                .attribute("sprite")
                .unwrap_or("interactable")
                .to_string(),
            lines: node
                .children()
                .filter(|child| child.is_element() && child.tag_name().name() == "Line")
                .map(|child| child.text().unwrap_or_default().trim().to_string())
                .collect(),
        },
        EntityTag::Teleporter => {
            let target_level = node
                .attribute("targetLevel")
                .ok_or_else(|| "teleporter is missing 'targetLevel'".to_string())?;
            SpawnRecord::Teleporter {
                coords,
                target_level: LevelId::new(target_level),
                target_coords: GridPoint::new(
                    entity_i32(node, "targetX")?,
                    entity_i32(node, "targetY")?,
                ),
            }
        }
    };

    Ok((tag, record))
}

fn entity_i32(node: Node<'_, '_>, attribute: &str) -> Result<i32, String> {
    let value = node
        .attribute(attribute)
        .ok_or_else(|| format!("missing '{attribute}' attribute"))?;
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid '{attribute}' value '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<LevelDescriptor, LevelLoadError> {
        parse_level_document(Path::new("test.xml"), raw)
    }

    #[test]
    fn parses_map_and_all_record_variants() {
        let level = parse(
            r#"<Level name="hall" width="4" height="3" fill="2">
                <Entity type="player" x="1" y="1"/>
                <Entity type="decoration" x="0" y="0" sprite="light-bulb"/>
                <Entity type="interactable" x="3" y="2" sprite="cat">
                    <Line>Meow.</Line>
                    <Line> Mrrp? </Line>
                </Entity>
                <Entity type="teleporter" x="2" y="2" targetLevel="yard" targetX="5" targetY="6"/>
                <Entity type="slime" x="3" y="0"/>
            </Level>"#,
        )
        .expect("level");

        assert_eq!(level.id().as_str(), "hall");
        assert_eq!(level.map().width(), 4);
        assert_eq!(level.map().tile_at(GridPoint::new(3, 2)), Some(2));
        assert_eq!(
            level.records(EntityTag::Player),
            &[SpawnRecord::Generic {
                coords: GridPoint::new(1, 1)
            }]
        );
        assert_eq!(
            level.records(EntityTag::Interactable),
            &[SpawnRecord::Interactable {
                coords: GridPoint::new(3, 2),
                sprite: "cat".to_string(),
                lines: vec!["Meow.".to_string(), "Mrrp?".to_string()],
            }]
        );
        assert_eq!(
            level.records(EntityTag::Teleporter),
            &[SpawnRecord::Teleporter {
                coords: GridPoint::new(2, 2),
                target_level: LevelId::new("yard"),
                target_coords: GridPoint::new(5, 6),
            }]
        );
        assert_eq!(level.records(EntityTag::Slime).len(), 1);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let level = parse(
            r#"<Level name="hall" width="4" height="4">
                <Entity type="dragon" x="1" y="1"/>
                <Entity type="slime" x="one" y="1"/>
                <Entity type="teleporter" x="2" y="2"/>
                <Entity type="slime" x="2" y="3"/>
            </Level>"#,
        )
        .expect("level");

        assert_eq!(level.record_count(), 1);
        assert_eq!(
            level.records(EntityTag::Slime),
            &[SpawnRecord::Generic {
                coords: GridPoint::new(2, 3)
            }]
        );
    }

    #[test]
    fn explicit_tiles_must_match_dimensions() {
        let ok = parse(
            r#"<Level name="tiny" width="2" height="2"><Tiles>1,0
            1,1</Tiles></Level>"#,
        )
        .expect("level");
        assert!(!ok.map().is_walkable(GridPoint::new(1, 0)));

        let err = parse(r#"<Level name="tiny" width="2" height="2"><Tiles>1,1,1</Tiles></Level>"#)
            .expect_err("tile count mismatch");
        assert!(matches!(err, LevelLoadError::InvalidMap { .. }));
    }

    #[test]
    fn wrong_root_and_missing_dimensions_fail_the_file() {
        assert!(matches!(
            parse(r#"<Defs/>"#),
            Err(LevelLoadError::InvalidRoot { .. })
        ));
        assert!(matches!(
            parse(r#"<Level name="x" width="3"/>"#),
            Err(LevelLoadError::MissingAttribute {
                attribute: "height",
                ..
            })
        ));
        assert!(matches!(
            parse(r#"<Level name="x" width="3" height="3""#),
            Err(LevelLoadError::XmlMalformed { .. })
        ));
    }
}
