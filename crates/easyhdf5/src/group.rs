//! Groups and the shared node surface of files and groups.

use std::mem::MaybeUninit;

use hdf5_sys::h5d::{H5Dcreate2, H5Dopen2};
use hdf5_sys::h5g::{H5G_info_t, H5Gcreate2, H5Gget_info, H5Gopen2};
use hdf5_sys::h5l::{H5Ldelete, H5Lexists, H5Lmove};
use hdf5_sys::h5o::H5Oopen;
use hdf5_sys::h5p::H5P_DEFAULT;

use easyhdf5_shape::Shape;

use crate::dataset::Dataset;
use crate::dataspace::Dataspace;
use crate::datatype::NativeScalar;
use crate::error::{ensure, ensure_id, ensure_tri, ErrorKind, Result};
use crate::iterate::{collect_names, visit_link_names};
use crate::object::{wrap_handle, Located, Object};
use crate::plist::{DatasetCreateProps, LinkCreateProps};
use crate::util::to_cstring;

wrap_handle! {
    /// A group within a file.
    Group
}

/// Container operations shared by [`File`](crate::File) (rooted at `/`)
/// and [`Group`].
pub trait Node: Located {
    /// Create a group at `path`, creating missing intermediate groups.
    fn create_group(&self, path: &str) -> Result<Group> {
        let lcpl = LinkCreateProps::new()?.intermediate_groups()?;
        let name = to_cstring(path)?;
        let hid = ensure_id(
            ErrorKind::Group,
            unsafe {
                H5Gcreate2(
                    self.loc_id(),
                    name.as_ptr(),
                    lcpl.id(),
                    H5P_DEFAULT,
                    H5P_DEFAULT,
                )
            },
            || format!("unable to create group \"{path}\""),
        )?;
        Ok(Group::from_id(hid))
    }

    /// Open the group at `path`.
    fn group(&self, path: &str) -> Result<Group> {
        let name = to_cstring(path)?;
        let hid = ensure_id(
            ErrorKind::Group,
            unsafe { H5Gopen2(self.loc_id(), name.as_ptr(), H5P_DEFAULT) },
            || format!("unable to open group \"{path}\""),
        )?;
        Ok(Group::from_id(hid))
    }

    /// Open the dataset at `path`.
    fn dataset(&self, path: &str) -> Result<Dataset> {
        let name = to_cstring(path)?;
        let hid = ensure_id(
            ErrorKind::Dataset,
            unsafe { H5Dopen2(self.loc_id(), name.as_ptr(), H5P_DEFAULT) },
            || format!("unable to open dataset \"{path}\""),
        )?;
        Ok(Dataset::from_id(hid))
    }

    /// Open the object at `path` without committing to its class.
    fn object(&self, path: &str) -> Result<Object> {
        let name = to_cstring(path)?;
        let hid = ensure_id(
            ErrorKind::Object,
            unsafe { H5Oopen(self.loc_id(), name.as_ptr(), H5P_DEFAULT) },
            || format!("unable to open \"{path}\""),
        )?;
        Ok(Object::from_id(hid))
    }

    /// Create a dataset of the scalar type `T` over `space`.
    fn create_dataset<T: NativeScalar>(&self, path: &str, space: &Dataspace) -> Result<Dataset> {
        let props = DatasetCreateProps::new()?;
        self.create_dataset_with::<T>(path, space, &props)
    }

    /// Create a dataset with explicit creation properties (chunking,
    /// compression).
    fn create_dataset_with<T: NativeScalar>(
        &self,
        path: &str,
        space: &Dataspace,
        props: &DatasetCreateProps,
    ) -> Result<Dataset> {
        let dtype = T::native_type()?;
        self.create_dataset_raw(path, &dtype, space, props)
    }

    /// Create a variable-length string dataset over `space`.
    fn create_str_dataset(&self, path: &str, space: &Dataspace) -> Result<Dataset> {
        let dtype = crate::Datatype::var_string()?;
        let props = DatasetCreateProps::new()?;
        self.create_dataset_raw(path, &dtype, space, &props)
    }

    #[doc(hidden)]
    fn create_dataset_raw(
        &self,
        path: &str,
        dtype: &crate::Datatype,
        space: &Dataspace,
        props: &DatasetCreateProps,
    ) -> Result<Dataset> {
        let lcpl = LinkCreateProps::new()?.intermediate_groups()?;
        let name = to_cstring(path)?;
        let hid = ensure_id(
            ErrorKind::Dataset,
            unsafe {
                H5Dcreate2(
                    self.loc_id(),
                    name.as_ptr(),
                    dtype.id(),
                    space.id(),
                    lcpl.id(),
                    props.id(),
                    H5P_DEFAULT,
                )
            },
            || format!("unable to create dataset \"{path}\""),
        )?;
        Ok(Dataset::from_id(hid))
    }

    /// Create a dataset shaped after `value` and write it in one step.
    fn create_dataset_from<T>(&self, path: &str, value: &T) -> Result<Dataset>
    where
        T: Shape + ?Sized,
        T::Elem: NativeScalar,
    {
        let space = Dataspace::simple(&value.dims())?;
        let dataset = self.create_dataset::<T::Elem>(path, &space)?;
        dataset.write(value)?;
        Ok(dataset)
    }

    /// Names of this node's children, in increasing name order.
    fn member_names(&self) -> Result<Vec<String>> {
        collect_names(|visit| visit_link_names(self.loc_id(), visit))
    }

    /// Invoke `visit` once per child name. A visitor failure aborts the
    /// iteration; names already visited stay visited.
    fn for_each_member(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        visit_link_names(self.loc_id(), visit)
    }

    /// Number of links in this node.
    fn num_objects(&self) -> Result<u64> {
        let mut info = MaybeUninit::<H5G_info_t>::uninit();
        ensure(
            ErrorKind::Group,
            unsafe { H5Gget_info(self.loc_id(), info.as_mut_ptr()) },
            || "unable to query group info".into(),
        )?;
        // SAFETY: H5Gget_info returned success, so the struct is filled.
        let info = unsafe { info.assume_init() };
        Ok(info.nlinks)
    }

    /// Whether a link named `path` exists under this node.
    fn exists(&self, path: &str) -> Result<bool> {
        let name = to_cstring(path)?;
        ensure_tri(
            ErrorKind::Group,
            unsafe { H5Lexists(self.loc_id(), name.as_ptr(), H5P_DEFAULT) },
            || format!("unable to check existence of \"{path}\""),
        )
    }

    /// Remove the link at `path`. The object becomes unreachable once all
    /// open handles to it close.
    fn unlink(&self, path: &str) -> Result<()> {
        let name = to_cstring(path)?;
        ensure(
            ErrorKind::Group,
            unsafe { H5Ldelete(self.loc_id(), name.as_ptr(), H5P_DEFAULT) },
            || format!("unable to unlink \"{path}\""),
        )
    }

    /// Move the link at `src` to `dst`, creating intermediate groups in
    /// the destination path.
    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let lcpl = LinkCreateProps::new()?.intermediate_groups()?;
        let csrc = to_cstring(src)?;
        let cdst = to_cstring(dst)?;
        ensure(
            ErrorKind::Group,
            unsafe {
                H5Lmove(
                    self.loc_id(),
                    csrc.as_ptr(),
                    self.loc_id(),
                    cdst.as_ptr(),
                    lcpl.id(),
                    H5P_DEFAULT,
                )
            },
            || format!("unable to rename \"{src}\" to \"{dst}\""),
        )
    }
}

impl Node for crate::File {}
impl Node for Group {}
