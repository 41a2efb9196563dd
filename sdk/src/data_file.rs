// Copyright 2024 Sigdoc contributors. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{Cursor, Read},
    path::{Path, PathBuf},
};

use crate::{Error, Result};

/// A named payload carried by a [`Container`](crate::Container).
///
/// The content may be fully materialized in memory or referenced from a file
/// on disk. Both representations are exposed uniformly through
/// [`bytes()`](Self::bytes) and [`reader()`](Self::reader).
///
/// Data file names are unique within a container; the comparison is
/// case-insensitive.
#[derive(Clone, Debug)]
pub struct DataFile {
    name: String,
    mime_type: String,
    content: DataFileContent,
}

/// Backing storage for a [`DataFile`].
#[derive(Clone, Debug)]
pub enum DataFileContent {
    /// Content held in memory.
    Bytes(Vec<u8>),

    /// Content read on demand from a file on disk.
    FileRef(PathBuf),
}

impl DataFile {
    /// Create a data file from in-memory bytes.
    pub fn from_bytes(data: Vec<u8>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        DataFile {
            name: name.into(),
            mime_type: mime_type.into(),
            content: DataFileContent::Bytes(data),
        }
    }

    /// Create a data file by reading a stream to its end.
    pub fn from_reader(
        mut reader: impl Read,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data, name, mime_type))
    }

    /// Create a data file referencing a file on disk.
    ///
    /// The container-internal name is derived from the path's file name.
    /// The content is read lazily; a missing file surfaces when the content
    /// is first requested.
    pub fn from_file(path: impl AsRef<Path>, mime_type: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::BadParam(format!("path has no file name: {}", path.display())))?;

        Ok(DataFile {
            name,
            mime_type: mime_type.into(),
            content: DataFileContent::FileRef(path.to_path_buf()),
        })
    }

    /// Returns the container-internal name of this data file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared MIME type of this data file.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the backing storage of this data file.
    pub fn content(&self) -> &DataFileContent {
        &self.content
    }

    /// Returns `true` if `name` matches this data file's name,
    /// case-insensitively.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Returns the full content of this data file.
    ///
    /// In-memory content is borrowed; file-backed content is read from disk.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match &self.content {
            DataFileContent::Bytes(data) => Ok(Cow::Borrowed(data)),
            DataFileContent::FileRef(path) => Ok(Cow::Owned(fs::read(path)?)),
        }
    }

    /// Returns a reader over the content of this data file.
    pub fn reader(&self) -> Result<Box<dyn Read + Send + '_>> {
        match &self.content {
            DataFileContent::Bytes(data) => Ok(Box::new(Cursor::new(data.as_slice()))),
            DataFileContent::FileRef(path) => Ok(Box::new(File::open(path)?)),
        }
    }
}
